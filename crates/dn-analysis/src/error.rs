//! Error types for dn-analysis

use thiserror::Error;

/// Analysis error type for deepnote-flow.
///
/// Lint findings are data, not errors; this type covers structural
/// failures of the analysis itself.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A001: Referenced block is not part of the analyzed notebook
    #[error("[A001] Block not in graph: {id}")]
    BlockNotInGraph { id: String },

    /// A002: Extraction input mismatch
    #[error("[A002] Symbol info count ({symbols}) does not match block count ({blocks})")]
    SymbolCountMismatch { symbols: usize, blocks: usize },
}

/// Result type alias for AnalysisError
pub type AnalysisResult<T> = Result<T, AnalysisError>;
