//! dn-exec - Execution planning and orchestration for deepnote-flow
//!
//! This crate turns a project into an execution plan (project, notebook,
//! or single-block-with-dependencies scope) and drives the plan through
//! a persistent interpreter process with a shared namespace.

pub mod error;
pub mod plan;
pub mod runner;
pub mod session;

pub use error::{ExecError, ExecResult};
pub use plan::{plan_scope, ExecutionPlan, ExecutionScope, PlannedBlock};
pub use runner::{BlockRunResult, RunOptions, RunStatus, RunSummary, Runner};
pub use session::{interpreter_available, ExecOutcome, KernelSession};
