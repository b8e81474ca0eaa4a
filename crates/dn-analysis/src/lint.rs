//! Lint engine: project-wide diagnostics over the dependency graph.
//!
//! Findings are data, not errors; a project with findings still loads,
//! plans, and runs. Output order is deterministic (project notebook
//! order, block sorting-key order, fixed code order per block) so
//! repeated runs on an unchanged project are byte-identical.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use dn_core::{integration_env_var, BlockId, BlockType, Notebook, Project};

use crate::builtins::is_builtin;
use crate::graph::DependencyGraph;

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// What kind of problem a finding reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingCode {
    UndefinedVariable,
    ParseError,
    UnusedVariable,
    MissingIntegration,
    MissingInput,
    CircularDependency,
    AnalysisFailed,
}

impl FindingCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCode::UndefinedVariable => "undefined-variable",
            FindingCode::ParseError => "parse-error",
            FindingCode::UnusedVariable => "unused-variable",
            FindingCode::MissingIntegration => "missing-integration",
            FindingCode::MissingInput => "missing-input",
            FindingCode::CircularDependency => "circular-dependency",
            FindingCode::AnalysisFailed => "analysis-failed",
        }
    }
}

/// One lint finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub severity: Severity,
    pub code: FindingCode,
    pub message: String,
    /// Name of the notebook the finding belongs to.
    pub notebook: String,
    /// Block the finding points at; notebook-level findings have none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockId>,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{} [{}] {}", severity, self.code.as_str(), self.message)?;
        write!(f, " ({}", self.notebook)?;
        if let Some(block) = &self.block {
            write!(f, ", block {}", block)?;
        }
        write!(f, ")")
    }
}

/// Lookup seam for integration environment bindings.
///
/// The convention maps each integration id to `SQL_<ID_UPPER_SNAKE>`;
/// this trait lets tests substitute the process environment.
pub trait IntegrationEnv {
    /// Whether the named environment variable is set.
    fn has(&self, var: &str) -> bool;
}

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl IntegrationEnv for SystemEnv {
    fn has(&self, var: &str) -> bool {
        std::env::var_os(var).is_some()
    }
}

/// Fixed set of variable names, for tests.
#[derive(Debug, Clone, Default)]
pub struct MapEnv(pub HashSet<String>);

impl MapEnv {
    pub fn with(vars: &[&str]) -> Self {
        Self(vars.iter().map(|v| v.to_string()).collect())
    }
}

impl IntegrationEnv for MapEnv {
    fn has(&self, var: &str) -> bool {
        self.0.contains(var)
    }
}

/// Lint an entire project.
///
/// A notebook whose analysis fails degrades to a single warning finding;
/// the rest of the project is still analyzed.
pub fn lint_project(project: &Project, env: &dyn IntegrationEnv) -> Vec<Finding> {
    let mut findings = Vec::new();
    for notebook in &project.notebooks {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            lint_notebook(notebook, env)
        }));
        match result {
            Ok(mut notebook_findings) => findings.append(&mut notebook_findings),
            Err(_) => {
                log::warn!("dependency analysis failed for notebook '{}'", notebook.name);
                findings.push(Finding {
                    severity: Severity::Warning,
                    code: FindingCode::AnalysisFailed,
                    message: format!(
                        "could not analyze dependencies for notebook '{}'",
                        notebook.name
                    ),
                    notebook: notebook.name.clone(),
                    block: None,
                });
            }
        }
    }
    findings
}

/// Lint one notebook.
pub fn lint_notebook(notebook: &Notebook, env: &dyn IntegrationEnv) -> Vec<Finding> {
    let graph = crate::graph::build_graph(notebook);
    let mut findings = Vec::new();

    let blocks = notebook.sorted_blocks();
    // The trailing block holds the notebook's displayed result, so its
    // definitions are exempt from unused-variable. A lone block is not:
    // nothing downstream could ever read it.
    let last_block_id = if blocks.len() > 1 {
        blocks.last().map(|b| b.id.clone())
    } else {
        None
    };

    for block in &blocks {
        let info = graph
            .symbols()
            .iter()
            .find(|(id, _)| id == &block.id)
            .map(|(_, info)| info);

        let finding = |severity, code, message: String| Finding {
            severity,
            code,
            message,
            notebook: notebook.name.clone(),
            block: Some(block.id.clone()),
        };

        if let Some(info) = info {
            if let Some(parse_error) = &info.parse_error {
                findings.push(finding(
                    Severity::Warning,
                    FindingCode::ParseError,
                    format!("block could not be parsed: {}", parse_error),
                ));
            }

            for (_, symbol) in graph.unresolved().iter().filter(|(id, _)| id == &block.id) {
                if is_builtin(symbol) {
                    continue;
                }
                findings.push(finding(
                    Severity::Error,
                    FindingCode::UndefinedVariable,
                    format!("'{}' is used but never defined", symbol),
                ));
            }

            if !notebook.is_module && Some(&block.id) != last_block_id.as_ref() {
                for symbol in &info.defined_symbols {
                    let consumed = graph
                        .symbols()
                        .iter()
                        .any(|(id, other)| id != &block.id && other.used_symbols.contains(symbol));
                    if !consumed {
                        findings.push(finding(
                            Severity::Warning,
                            FindingCode::UnusedVariable,
                            format!("'{}' is defined but never used", symbol),
                        ));
                    }
                }
            }
        }

        if block.block_type == BlockType::Sql {
            if let Some(integration_id) = block.metadata.sql_integration_id.as_deref() {
                let var = integration_env_var(integration_id);
                if !env.has(&var) {
                    findings.push(finding(
                        Severity::Error,
                        FindingCode::MissingIntegration,
                        format!(
                            "integration '{}' has no environment binding (expected {})",
                            integration_id, var
                        ),
                    ));
                }
            }
        }

        if block.block_type.is_input() {
            let value = block.metadata.deepnote_variable_value.as_deref();
            let default = block.metadata.deepnote_input_default_value.as_deref();
            let usable = |v: Option<&str>| v.is_some_and(|s| !s.is_empty());
            if !usable(value) && !usable(default) {
                findings.push(finding(
                    Severity::Warning,
                    FindingCode::MissingInput,
                    "input has no value and no default".to_string(),
                ));
            }
        }
    }

    if let Some(cycle) = graph.detect_cycle() {
        findings.push(Finding {
            severity: Severity::Warning,
            code: FindingCode::CircularDependency,
            message: format!("circular dependency between blocks: {}", cycle),
            notebook: notebook.name.clone(),
            block: None,
        });
    }

    findings
}

#[cfg(test)]
#[path = "lint_test.rs"]
mod tests;
