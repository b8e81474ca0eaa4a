//! Lint command implementation - project analysis findings

use anyhow::{bail, Result};
use dn_analysis::{lint_notebook, lint_project, Finding, Severity, SystemEnv};

use crate::cli::{GlobalArgs, LintArgs, ReportOutput};
use crate::commands::common;

/// Execute the lint command
pub async fn execute(args: &LintArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::load_project(global)?;

    let findings = match &args.notebook {
        Some(reference) => {
            let Some(notebook) = project.get_notebook(reference) else {
                bail!("Notebook '{}' not found in project", reference);
            };
            lint_notebook(notebook, &SystemEnv)
        }
        None => lint_project(&project, &SystemEnv),
    };

    match args.output {
        ReportOutput::Text => print_text(&findings),
        ReportOutput::Json => println!("{}", serde_json::to_string_pretty(&findings)?),
    }

    let errors = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .count();
    if errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn print_text(findings: &[Finding]) {
    for finding in findings {
        println!("{}", finding);
    }

    let errors = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .count();
    let warnings = findings.len() - errors;
    if findings.is_empty() {
        println!("No findings");
    } else {
        println!();
        println!("{} errors, {} warnings", errors, warnings);
    }
}
