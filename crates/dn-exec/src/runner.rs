//! Execution orchestrator: drives a persistent interpreter through an
//! execution plan.
//!
//! A run is strictly sequential. Blocks share the interpreter's
//! namespace, so later blocks may read state left by earlier ones; no
//! block execution is ever reordered or parallelized. Per-block results
//! surface through a callback invoked exactly once per attempted block,
//! in plan order, as soon as each result is available.

use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use dn_analysis::python::{comment_out_magics, sanitize_variable_name};
use dn_core::{Block, BlockId, BlockType, Project};

use crate::error::{ExecError, ExecResult};
use crate::plan::{plan_scope, ExecutionPlan, ExecutionScope};
use crate::session::KernelSession;

/// Outcome of one block's execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
    /// The block has no interpreter-runnable source (SQL without a local
    /// engine, display blocks with symbols); it is recorded, not sent.
    Skipped,
}

/// Per-block result delivered through the progress callback.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRunResult {
    pub block_id: BlockId,
    pub notebook_id: String,
    pub status: RunStatus,
    /// Captured stdout.
    pub output: String,
    /// Traceback text on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Aggregate result of a run scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Blocks that ran (or were recorded as no-ops) without failing.
    pub executed_blocks: usize,
    /// Blocks that failed.
    pub failed_blocks: usize,
    /// Blocks in the plan.
    pub total_blocks: usize,
    pub total_duration_ms: u64,
}

/// Options for a run scope.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Overrides for input-block values, keyed by the input's declared
    /// variable name.
    pub inputs: HashMap<String, String>,

    /// Abort after the first failed block instead of continuing.
    pub stop_on_error: bool,
}

/// Owns the interpreter session for the lifetime of a run.
///
/// State machine: `Idle -> Started -> Stopped` (and back to `Started`
/// via a fresh `start`). Running a scope while idle is an error.
#[derive(Debug, Default)]
pub struct Runner {
    session: Option<KernelSession>,
}

impl Runner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a session is live.
    pub fn is_started(&self) -> bool {
        self.session.is_some()
    }

    /// Provision the persistent interpreter process.
    ///
    /// An already-running session is shut down first.
    pub async fn start(&mut self, interpreter: &Path, working_dir: &Path) -> ExecResult<()> {
        if let Some(old) = self.session.take() {
            old.shutdown().await?;
        }
        self.session = Some(KernelSession::start(interpreter, working_dir).await?);
        Ok(())
    }

    /// Release the interpreter process. Idempotent.
    pub async fn stop(&mut self) -> ExecResult<()> {
        match self.session.take() {
            Some(session) => session.shutdown().await,
            None => Ok(()),
        }
    }

    /// Compute the plan for a scope without touching any process.
    pub fn dry_run(&self, project: &Project, scope: &ExecutionScope) -> ExecResult<ExecutionPlan> {
        plan_scope(project, scope)
    }

    /// Execute a scope, attaching results to the project's blocks.
    ///
    /// `on_block_result` fires exactly once per attempted block, in plan
    /// order, including failures. A block failure does not abort the run
    /// unless `stop_on_error` is set; a process failure does, with the
    /// session released either way.
    pub async fn run_scope<F>(
        &mut self,
        project: &mut Project,
        scope: &ExecutionScope,
        options: &RunOptions,
        mut on_block_result: F,
    ) -> ExecResult<RunSummary>
    where
        F: FnMut(&BlockRunResult),
    {
        let plan = plan_scope(project, scope)?;
        let mut session = self.session.take().ok_or(ExecError::SessionNotStarted)?;

        let run_started = Instant::now();
        let mut summary = RunSummary {
            total_blocks: plan.blocks.len(),
            ..RunSummary::default()
        };

        for planned in &plan.blocks {
            let source = project
                .find_block(&planned.block_id)
                .map(|(_, block)| render_source(block, &options.inputs));

            let started_at = Utc::now();
            let result = match source.flatten() {
                None => BlockRunResult {
                    block_id: planned.block_id.clone(),
                    notebook_id: planned.notebook_id.clone(),
                    status: RunStatus::Skipped,
                    output: String::new(),
                    error: None,
                    duration_ms: 0,
                },
                Some(code) => match session.execute(&code).await {
                    Ok(outcome) => {
                        let status = if outcome.ok {
                            RunStatus::Success
                        } else {
                            RunStatus::Error
                        };
                        let result = BlockRunResult {
                            block_id: planned.block_id.clone(),
                            notebook_id: planned.notebook_id.clone(),
                            status,
                            output: outcome.stdout.clone(),
                            error: outcome.error.clone(),
                            duration_ms: outcome.duration_ms.round() as u64,
                        };
                        if let Some(block) = project.find_block_mut(&planned.block_id) {
                            block.execution_count = Some(block.execution_count.unwrap_or(0) + 1);
                            block.execution_started_at = Some(started_at);
                            block.execution_finished_at = Some(Utc::now());
                            block.outputs = build_outputs(&outcome.stdout, &outcome.result, &outcome.error);
                        }
                        result
                    }
                    Err(e) => {
                        // Infrastructure failure: abort the run, but
                        // release the process first
                        let _ = session.shutdown().await;
                        return Err(e);
                    }
                },
            };

            match result.status {
                RunStatus::Error => summary.failed_blocks += 1,
                _ => summary.executed_blocks += 1,
            }
            on_block_result(&result);

            if result.status == RunStatus::Error && options.stop_on_error {
                log::debug!("stopping after failed block {}", result.block_id);
                break;
            }
        }

        summary.total_duration_ms = run_started.elapsed().as_millis() as u64;
        self.session = Some(session);
        Ok(summary)
    }
}

/// Render the interpreter payload for a block, or `None` for blocks that
/// are recorded without being sent.
fn render_source(block: &Block, inputs: &HashMap<String, String>) -> Option<String> {
    match &block.block_type {
        BlockType::Code => Some(comment_out_magics(&block.content)),
        kind if kind.is_input() => {
            let declared = block.metadata.deepnote_variable_name.as_deref()?;
            let variable = sanitize_variable_name(declared);
            let value = inputs
                .get(declared)
                .or_else(|| inputs.get(&variable))
                .map(String::as_str)
                .or(block.metadata.deepnote_variable_value.as_deref())
                .or(block.metadata.deepnote_input_default_value.as_deref())?;
            Some(format!("{} = {}", variable, python_literal(value)))
        }
        _ => None,
    }
}

/// Render an input value as a Python literal: numbers and the keyword
/// constants pass through, everything else becomes a string literal.
fn python_literal(value: &str) -> String {
    if value.parse::<f64>().is_ok() && !value.is_empty() {
        return value.to_string();
    }
    if matches!(value, "True" | "False" | "None") {
        return value.to_string();
    }
    // JSON string escaping is valid Python
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Shape captured results into stored output entries.
fn build_outputs(
    stdout: &str,
    result: &Option<String>,
    error: &Option<String>,
) -> Vec<serde_json::Value> {
    let mut outputs = Vec::new();
    if !stdout.is_empty() {
        outputs.push(serde_json::json!({
            "type": "stream",
            "name": "stdout",
            "text": stdout,
        }));
    }
    if let Some(result) = result {
        outputs.push(serde_json::json!({
            "type": "execute_result",
            "data": { "text/plain": result },
        }));
    }
    if let Some(error) = error {
        outputs.push(serde_json::json!({
            "type": "error",
            "evalue": error,
        }));
    }
    outputs
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
