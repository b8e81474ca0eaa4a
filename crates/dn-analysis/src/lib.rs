//! dn-analysis - Reactive dependency analysis for deepnote-flow
//!
//! This crate provides per-block symbol extraction (pluggable per guest
//! language), the block dependency graph, and the lint engine that flags
//! undefined symbols, unused definitions, missing integration bindings,
//! and unfilled inputs.

pub mod builtins;
pub mod error;
pub mod extract;
pub mod graph;
pub mod lint;
pub mod python;
pub mod sql;

pub use error::{AnalysisError, AnalysisResult};
pub use extract::{extract_block, BlockExtractor, SymbolInfo};
pub use graph::{build_graph, DependencyGraph};
pub use lint::{
    lint_notebook, lint_project, Finding, FindingCode, IntegrationEnv, MapEnv, Severity, SystemEnv,
};
