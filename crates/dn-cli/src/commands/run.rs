//! Run command implementation - execute blocks through the orchestrator

use anyhow::{bail, Context, Result};
use chrono::Utc;
use dn_core::snapshot;
use dn_exec::{interpreter_available, ExecutionScope, RunOptions, RunStatus, Runner};
use std::path::Path;
use std::time::Instant;

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common;

/// Execute the run command
pub async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let mut project = common::load_project(global)?;

    let scope = match (&args.notebook, &args.block) {
        (_, Some(block)) => ExecutionScope::Block(block.clone()),
        (Some(notebook), None) => ExecutionScope::Notebook(notebook.clone()),
        (None, None) => ExecutionScope::Project,
    };

    let mut runner = Runner::new();
    let plan = runner.dry_run(&project, &scope)?;

    if args.dry_run {
        println!("Plan for {} ({} blocks):", plan.scope, plan.blocks.len());
        for planned in &plan.blocks {
            println!(
                "  {} [{}] in {}",
                planned.block_id,
                planned.block_type.as_str(),
                planned.notebook_name
            );
        }
        return Ok(());
    }

    if plan.blocks.is_empty() {
        println!("Nothing to run in {}", plan.scope);
        return Ok(());
    }

    let interpreter = Path::new(&args.interpreter);
    if !interpreter_available(interpreter) {
        bail!("Interpreter '{}' is not available", args.interpreter);
    }

    let options = RunOptions {
        inputs: common::parse_inputs(&args.inputs)?,
        stop_on_error: args.stop_on_error,
    };
    let working_dir = Path::new(&global.project)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    println!("Running {} blocks...\n", plan.blocks.len());
    let total = plan.blocks.len();
    let started_at = Utc::now();
    let start_time = Instant::now();

    runner.start(interpreter, working_dir).await?;
    let mut attempted = 0usize;
    let run_result = runner
        .run_scope(&mut project, &scope, &options, |result| {
            attempted += 1;
            let status = match result.status {
                RunStatus::Success => "ok",
                RunStatus::Error => "FAILED",
                RunStatus::Skipped => "skipped",
            };
            println!(
                "  [{}/{}] {} ... {} ({}ms)",
                attempted, total, result.block_id, status, result.duration_ms
            );
            if global.verbose && !result.output.is_empty() {
                for line in result.output.lines() {
                    eprintln!("[verbose]   {}", line);
                }
            }
            if let Some(error) = &result.error {
                for line in error.lines() {
                    eprintln!("    {}", line);
                }
            }
        })
        .await;
    runner.stop().await?;
    let summary = run_result?;

    println!();
    println!(
        "Executed {} of {} blocks, {} failed in {:.2}s",
        summary.executed_blocks,
        summary.total_blocks,
        summary.failed_blocks,
        start_time.elapsed().as_secs_f64()
    );

    if let Some(dir) = &args.snapshot_dir {
        let dir = Path::new(dir);
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;

        let (_, mut snap) = snapshot::split(&project);
        snap.execution = snapshot::ExecutionMeta {
            trigger: Some("cli".to_string()),
            started_at: Some(started_at),
            finished_at: Some(Utc::now()),
            executed_blocks: summary.executed_blocks,
            failed_blocks: summary.failed_blocks,
            total_blocks: summary.total_blocks,
            error: None,
        };
        let path = dir.join(snap.file_name(false, "yaml"));
        snap.save(&path)?;
        println!("Snapshot written to {}", path.display());
    }

    if summary.failed_blocks > 0 {
        std::process::exit(1);
    }
    Ok(())
}
