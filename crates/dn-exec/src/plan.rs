//! Execution planning: turning a requested scope into an ordered block
//! list.
//!
//! Project and notebook scopes follow document order (notebooks in
//! project order, blocks in sorting-key order), not a global topological
//! sort; authors are assumed to have ordered blocks consistently with
//! their own forward dependencies. Block scope runs the target's
//! transitive upstream dependencies first, then the target.

use serde::Serialize;

use dn_analysis::build_graph;
use dn_core::{Block, BlockId, Notebook, Project};

use crate::error::{ExecError, ExecResult};

/// What to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionScope {
    /// Every notebook in the project.
    Project,
    /// One notebook, matched by id or name.
    Notebook(String),
    /// One block, matched by exact id or unambiguous id prefix, plus its
    /// upstream dependencies.
    Block(String),
}

impl std::fmt::Display for ExecutionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionScope::Project => write!(f, "project"),
            ExecutionScope::Notebook(name) => write!(f, "notebook {}", name),
            ExecutionScope::Block(id) => write!(f, "block {}", id),
        }
    }
}

/// One entry of an execution plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedBlock {
    pub block_id: BlockId,
    pub notebook_id: String,
    pub notebook_name: String,
    pub block_type: String,
}

impl PlannedBlock {
    fn new(notebook: &Notebook, block: &Block) -> Self {
        Self {
            block_id: block.id.clone(),
            notebook_id: notebook.id.clone(),
            notebook_name: notebook.name.clone(),
            block_type: block.block_type.to_string(),
        }
    }
}

/// Ordered list of blocks to execute for a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
    /// Human-readable scope description.
    pub scope: String,
    pub blocks: Vec<PlannedBlock>,
}

impl ExecutionPlan {
    pub fn block_ids(&self) -> Vec<&BlockId> {
        self.blocks.iter().map(|b| &b.block_id).collect()
    }
}

/// Compute the execution plan for a scope.
pub fn plan_scope(project: &Project, scope: &ExecutionScope) -> ExecResult<ExecutionPlan> {
    let blocks = match scope {
        ExecutionScope::Project => {
            let mut blocks = Vec::new();
            for notebook in &project.notebooks {
                push_notebook_blocks(notebook, &mut blocks);
            }
            blocks
        }
        ExecutionScope::Notebook(name) => {
            let notebook =
                project
                    .get_notebook(name)
                    .ok_or_else(|| ExecError::NotebookNotFound {
                        name: name.clone(),
                    })?;
            let mut blocks = Vec::new();
            push_notebook_blocks(notebook, &mut blocks);
            blocks
        }
        ExecutionScope::Block(reference) => plan_block_scope(project, reference)?,
    };

    Ok(ExecutionPlan {
        scope: scope.to_string(),
        blocks,
    })
}

fn push_notebook_blocks(notebook: &Notebook, out: &mut Vec<PlannedBlock>) {
    for block in notebook.sorted_blocks() {
        if block.is_executable() {
            out.push(PlannedBlock::new(notebook, block));
        }
    }
}

/// Plan for one block: upstream closure in dependency order, then the
/// target itself.
fn plan_block_scope(project: &Project, reference: &str) -> ExecResult<Vec<PlannedBlock>> {
    let (notebook, target) = resolve_block(project, reference)?;
    if !target.is_executable() {
        return Err(ExecError::NotExecutable {
            id: target.id.to_string(),
            block_type: target.block_type.to_string(),
        });
    }

    let graph = build_graph(notebook);
    let mut blocks = Vec::new();
    for dep_id in graph.upstream_closure(&target.id) {
        let Some(block) = notebook.get_block(dep_id) else {
            continue;
        };
        blocks.push(PlannedBlock::new(notebook, block));
    }
    blocks.push(PlannedBlock::new(notebook, target));
    Ok(blocks)
}

/// Locate a block by exact id, then by unambiguous id prefix.
fn resolve_block<'a>(
    project: &'a Project,
    reference: &str,
) -> ExecResult<(&'a Notebook, &'a Block)> {
    if let Some(found) = project.find_block(reference) {
        return Ok(found);
    }

    let matches: Vec<(&Notebook, &Block)> = project
        .notebooks
        .iter()
        .flat_map(|n| n.blocks.iter().map(move |b| (n, b)))
        .filter(|(_, b)| b.id.as_str().starts_with(reference))
        .collect();

    match matches.len() {
        0 => Err(ExecError::BlockNotFound {
            id: reference.to_string(),
        }),
        1 => Ok(matches[0]),
        _ => Err(ExecError::AmbiguousBlock {
            prefix: reference.to_string(),
            candidates: matches
                .iter()
                .map(|(_, b)| b.id.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
