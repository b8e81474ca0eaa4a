//! Block types: the atomic units of a notebook.
//!
//! A block is a code cell, SQL cell, markdown cell, interactive input, or
//! one of the display-only kinds. Only executable kinds carry execution
//! fields (count, timings, outputs).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::block_id::BlockId;
use crate::checksum::compute_checksum_parts;

/// The kind of a block, selecting its capability set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockType {
    Code,
    Sql,
    Markdown,
    Text,
    InputText,
    InputSlider,
    InputSelect,
    InputDate,
    InputSwitch,
    InputFile,
    Button,
    BigNumber,
    Chart,
    Image,
    Separator,
    /// Unknown block kind, preserved verbatim for forward compatibility.
    Other(String),
}

impl BlockType {
    /// The on-disk tag for this block type.
    pub fn as_str(&self) -> &str {
        match self {
            BlockType::Code => "code",
            BlockType::Sql => "sql",
            BlockType::Markdown => "markdown",
            BlockType::Text => "text",
            BlockType::InputText => "input-text",
            BlockType::InputSlider => "input-slider",
            BlockType::InputSelect => "input-select",
            BlockType::InputDate => "input-date",
            BlockType::InputSwitch => "input-switch",
            BlockType::InputFile => "input-file",
            BlockType::Button => "button",
            BlockType::BigNumber => "big-number",
            BlockType::Chart => "chart",
            BlockType::Image => "image",
            BlockType::Separator => "separator",
            BlockType::Other(tag) => tag,
        }
    }

    /// Parse an on-disk tag. Unknown tags become [`BlockType::Other`].
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "code" => BlockType::Code,
            "sql" => BlockType::Sql,
            "markdown" => BlockType::Markdown,
            "text" => BlockType::Text,
            "input-text" => BlockType::InputText,
            "input-slider" => BlockType::InputSlider,
            "input-select" => BlockType::InputSelect,
            "input-date" => BlockType::InputDate,
            "input-switch" => BlockType::InputSwitch,
            "input-file" => BlockType::InputFile,
            "button" => BlockType::Button,
            "big-number" => BlockType::BigNumber,
            "chart" => BlockType::Chart,
            "image" => BlockType::Image,
            "separator" => BlockType::Separator,
            other => BlockType::Other(other.to_string()),
        }
    }

    /// Whether blocks of this type participate in execution.
    pub fn is_executable(&self) -> bool {
        matches!(
            self,
            BlockType::Code
                | BlockType::Sql
                | BlockType::InputText
                | BlockType::InputSlider
                | BlockType::InputSelect
                | BlockType::InputDate
                | BlockType::InputSwitch
                | BlockType::InputFile
                | BlockType::Button
                | BlockType::BigNumber
                | BlockType::Chart
        )
    }

    /// Whether this is one of the interactive input kinds.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            BlockType::InputText
                | BlockType::InputSlider
                | BlockType::InputSelect
                | BlockType::InputDate
                | BlockType::InputSwitch
                | BlockType::InputFile
        )
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for BlockType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BlockType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(BlockType::from_tag(&tag))
    }
}

/// Per-block metadata: typed known keys plus an open extension map.
///
/// Known keys are validated per block kind by the analysis layer; unknown
/// keys round-trip opaquely through `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockMetadata {
    /// Symbol name an input, SQL, or button block exposes to the namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deepnote_variable_name: Option<String>,

    /// Current value of an input block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deepnote_variable_value: Option<String>,

    /// Default value of an input block, used when no value is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deepnote_input_default_value: Option<String>,

    /// Integration a SQL block runs against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_integration_id: Option<String>,

    /// Symbol a big-number block displays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deepnote_big_number_value: Option<String>,

    /// Symbol a big-number block compares against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deepnote_big_number_comparison_value: Option<String>,

    /// Unknown keys, passed through opaquely.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl BlockMetadata {
    /// Whether every field (known and extra) is unset.
    pub fn is_empty(&self) -> bool {
        self.deepnote_variable_name.is_none()
            && self.deepnote_variable_value.is_none()
            && self.deepnote_input_default_value.is_none()
            && self.sql_integration_id.is_none()
            && self.deepnote_big_number_value.is_none()
            && self.deepnote_big_number_comparison_value.is_none()
            && self.extra.is_empty()
    }
}

/// Atomic unit of a notebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Unique id within the project.
    pub id: BlockId,

    /// Lexicographic ordering key within the notebook.
    pub sorting_key: String,

    /// Grouping tag for consecutive related blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_group: Option<String>,

    /// Block kind.
    #[serde(rename = "type")]
    pub block_type: BlockType,

    /// Source text; language is implied by the block type.
    #[serde(default)]
    pub content: String,

    /// Type-specific metadata.
    #[serde(default, skip_serializing_if = "BlockMetadata::is_empty")]
    pub metadata: BlockMetadata,

    /// Number of times this block has been executed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_count: Option<u64>,

    /// When the last execution started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_started_at: Option<DateTime<Utc>>,

    /// When the last execution finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_finished_at: Option<DateTime<Utc>>,

    /// Captured outputs from the last execution, stored opaquely.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<serde_json::Value>,
}

impl Block {
    /// Create a block with the given id, sorting key, type, and content.
    pub fn new(
        id: impl Into<BlockId>,
        sorting_key: impl Into<String>,
        block_type: BlockType,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            sorting_key: sorting_key.into(),
            block_group: None,
            block_type,
            content: content.into(),
            metadata: BlockMetadata::default(),
            execution_count: None,
            execution_started_at: None,
            execution_finished_at: None,
            outputs: Vec::new(),
        }
    }

    /// Whether this block participates in execution.
    pub fn is_executable(&self) -> bool {
        self.block_type.is_executable()
    }

    /// Deterministic hash of the block's authoring-relevant fields.
    ///
    /// Covers type, content, and the metadata keys that change what the
    /// block computes. Execution fields and display-only metadata are
    /// excluded so re-running a block never changes its hash.
    pub fn content_hash(&self) -> String {
        let meta = &self.metadata;
        compute_checksum_parts([
            self.block_type.as_str(),
            &self.content,
            meta.deepnote_variable_name.as_deref().unwrap_or(""),
            meta.deepnote_variable_value.as_deref().unwrap_or(""),
            meta.deepnote_input_default_value.as_deref().unwrap_or(""),
            meta.sql_integration_id.as_deref().unwrap_or(""),
            meta.deepnote_big_number_value.as_deref().unwrap_or(""),
            meta.deepnote_big_number_comparison_value
                .as_deref()
                .unwrap_or(""),
        ])
    }

    /// Clear all execution-bearing fields.
    pub fn clear_execution_fields(&mut self) {
        self.execution_count = None;
        self.execution_started_at = None;
        self.execution_finished_at = None;
        self.outputs.clear();
    }
}

#[cfg(test)]
#[path = "block_test.rs"]
mod tests;
