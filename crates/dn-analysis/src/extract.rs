//! Per-block symbol extraction.
//!
//! Each block kind maps to an extractor that reports which symbols the
//! block defines, which it consumes, and which modules it imports. The
//! graph builder depends only on this contract, so new guest languages
//! plug in without touching it.

use serde::Serialize;
use std::collections::BTreeSet;

use dn_core::{Block, BlockType};

use crate::python;
use crate::sql;

/// Symbols defined and consumed by one block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    /// Symbols this block defines at the top level.
    pub defined_symbols: BTreeSet<String>,

    /// Symbols this block consumes (builtins excluded).
    pub used_symbols: BTreeSet<String>,

    /// Modules this block imports (binding names, aliases applied).
    pub imported_modules: BTreeSet<String>,

    /// Set when the block's source could not be analyzed. A block with a
    /// parse error contributes no symbols but still reports a lint
    /// finding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

impl SymbolInfo {
    /// Symbol info for a block that failed to parse.
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self {
            parse_error: Some(message.into()),
            ..Self::default()
        }
    }

    /// All symbols this block makes available to others (definitions plus
    /// import bindings).
    pub fn provided(&self) -> impl Iterator<Item = &String> {
        self.defined_symbols.iter().chain(self.imported_modules.iter())
    }
}

/// Capability interface for per-language symbol extraction.
pub trait BlockExtractor {
    /// Extract symbol information from one block.
    fn extract(&self, block: &Block) -> SymbolInfo;
}

/// The built-in extractor registry, dispatching on block type.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExtractor;

impl BlockExtractor for DefaultExtractor {
    fn extract(&self, block: &Block) -> SymbolInfo {
        extract_block(block)
    }
}

/// Extract symbol information from one block using the built-in
/// extractors.
pub fn extract_block(block: &Block) -> SymbolInfo {
    let metadata = &block.metadata;
    match &block.block_type {
        BlockType::Code => python::extract_python(&block.content),
        BlockType::Sql => {
            let mut info = sql::extract_sql(&block.content);
            if let Some(name) = metadata.deepnote_variable_name.as_deref() {
                if !name.is_empty() {
                    info.defined_symbols.insert(name.to_string());
                }
            }
            info
        }
        BlockType::Button => {
            let mut info = SymbolInfo::default();
            if let Some(name) = metadata.deepnote_variable_name.as_deref() {
                if !name.is_empty() {
                    info.defined_symbols.insert(name.to_string());
                }
            }
            info
        }
        BlockType::BigNumber => {
            let mut info = SymbolInfo::default();
            for value in [
                metadata.deepnote_big_number_value.as_deref(),
                metadata.deepnote_big_number_comparison_value.as_deref(),
            ]
            .into_iter()
            .flatten()
            {
                if !value.is_empty() {
                    info.used_symbols.insert(value.to_string());
                }
            }
            info
        }
        kind if kind.is_input() => {
            let mut info = SymbolInfo::default();
            if let Some(name) = metadata.deepnote_variable_name.as_deref() {
                if !name.is_empty() {
                    info.defined_symbols
                        .insert(python::sanitize_variable_name(name));
                }
            }
            info
        }
        _ => SymbolInfo::default(),
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
