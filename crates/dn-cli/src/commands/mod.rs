//! CLI command implementations

pub(crate) mod common;
pub(crate) mod graph;
pub(crate) mod lint;
pub(crate) mod run;
pub(crate) mod snapshot;
