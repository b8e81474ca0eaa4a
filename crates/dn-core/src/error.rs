//! Error types for dn-core

use thiserror::Error;

/// Core error type for deepnote-flow
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Project file not found
    #[error("[C001] Project file not found: {path}")]
    ProjectNotFound { path: String },

    /// C002: Unsupported project file extension
    #[error("[C002] Unsupported project file extension '{extension}' for {path}: expected .deepnote, .yaml, .yml, or .json")]
    UnsupportedExtension { path: String, extension: String },

    /// C003: Duplicate block id within a project
    #[error("[C003] Duplicate block id '{id}' in notebook '{notebook}'")]
    DuplicateBlockId { id: String, notebook: String },

    /// C004: Malformed snapshot file name
    #[error("[C004] Malformed snapshot file name: {name}")]
    BadSnapshotName { name: String },

    /// C005: IO error
    #[error("[C005] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// C006: IO error with file path context
    #[error("[C006] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C007: YAML parse error
    #[error("[C007] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
