//! Error types for dn-exec

use thiserror::Error;

/// Execution error type for deepnote-flow
#[derive(Error, Debug)]
pub enum ExecError {
    /// X001: Requested notebook does not exist
    #[error("[X001] Notebook not found: {name}")]
    NotebookNotFound { name: String },

    /// X002: Requested block does not exist
    #[error("[X002] Block not found: {id}")]
    BlockNotFound { id: String },

    /// X003: A block id prefix matched more than one block
    #[error("[X003] Ambiguous block id prefix '{prefix}': matches {candidates}")]
    AmbiguousBlock { prefix: String, candidates: String },

    /// X004: The requested block is not executable
    #[error("[X004] Block {id} has type '{block_type}' and cannot be executed")]
    NotExecutable { id: String, block_type: String },

    /// X005: A run was requested before the session was started
    #[error("[X005] Interpreter session not started")]
    SessionNotStarted,

    /// X006: The interpreter process could not start or died mid-run
    #[error("[X006] Interpreter process failure: {message}")]
    ProcessFailure { message: String },

    /// X007: Malformed response from the interpreter driver
    #[error("[X007] Interpreter protocol error: {message}")]
    Protocol { message: String },

    /// X008: IO error talking to the interpreter
    #[error("[X008] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for ExecError
pub type ExecResult<T> = Result<T, ExecError>;
