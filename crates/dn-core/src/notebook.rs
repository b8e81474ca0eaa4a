//! Notebook: an ordered sequence of blocks.

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::block_id::BlockId;

/// How a notebook reacts when a single block is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// Run only the requested block.
    #[default]
    Block,
    /// Run the requested block and everything downstream of it.
    BlockWithDependencies,
}

/// A named, ordered sequence of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notebook {
    /// Unique id within the project.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Execution mode for single-block runs.
    #[serde(default)]
    pub execution_mode: ExecutionMode,

    /// Module notebooks hold reusable definitions rather than a runnable
    /// pipeline.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_module: bool,

    /// Blocks, ordered by sorting key.
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Notebook {
    /// Create an empty notebook.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            execution_mode: ExecutionMode::default(),
            is_module: false,
            blocks: Vec::new(),
        }
    }

    /// Blocks in sorting-key order.
    ///
    /// Persisted files normally keep blocks sorted already; this re-sorts
    /// so downstream passes can rely on the order.
    pub fn sorted_blocks(&self) -> Vec<&Block> {
        let mut blocks: Vec<&Block> = self.blocks.iter().collect();
        blocks.sort_by(|a, b| a.sorting_key.cmp(&b.sorting_key));
        blocks
    }

    /// Look up a block by exact id.
    pub fn get_block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Look up a block by exact id, mutably.
    pub fn get_block_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    /// Ids of all executable blocks in sorting-key order.
    pub fn executable_block_ids(&self) -> Vec<BlockId> {
        self.sorted_blocks()
            .into_iter()
            .filter(|b| b.is_executable())
            .map(|b| b.id.clone())
            .collect()
    }
}
