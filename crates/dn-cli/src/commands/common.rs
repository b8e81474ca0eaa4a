//! Shared utilities for CLI commands

use anyhow::{bail, Context, Result};
use dn_core::Project;
use std::collections::HashMap;
use std::path::Path;

use crate::cli::GlobalArgs;

/// Load and validate the project named by `--project`.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let path = Path::new(&global.project);
    let project = Project::load(path)
        .with_context(|| format!("Failed to load project from {}", path.display()))?;
    project.validate().context("Project validation failed")?;
    if global.verbose {
        eprintln!(
            "[verbose] Loaded project '{}' ({} notebooks)",
            project.name,
            project.notebooks.len()
        );
    }
    Ok(project)
}

/// Parse repeated `NAME=VALUE` input overrides.
pub(crate) fn parse_inputs(raw: &[String]) -> Result<HashMap<String, String>> {
    let mut inputs = HashMap::new();
    for pair in raw {
        let Some((name, value)) = pair.split_once('=') else {
            bail!("Invalid --input '{}': expected NAME=VALUE", pair);
        };
        if name.is_empty() {
            bail!("Invalid --input '{}': empty name", pair);
        }
        inputs.insert(name.to_string(), value.to_string());
    }
    Ok(inputs)
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
