//! Snapshot model: splitting captured outputs from editable source.
//!
//! A snapshot is a project-shaped file holding the execution-bearing half
//! of a project (outputs, timings, run metadata) plus a content hash per
//! block captured at split time. Keeping snapshots out of the source file
//! keeps version control clean; the hashes let a later merge detect blocks
//! whose source has drifted since the outputs were captured.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::block_id::BlockId;
use crate::error::{CoreError, CoreResult};
use crate::project::{Project, FORMAT_VERSION};

/// Timestamp format used in snapshot file names.
const STAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Run-level metadata recorded with a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionMeta {
    /// What initiated the run (e.g. "cli", "schedule").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,

    /// When the run started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the run finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Blocks that were attempted.
    #[serde(default)]
    pub executed_blocks: usize,

    /// Blocks that failed.
    #[serde(default)]
    pub failed_blocks: usize,

    /// Blocks in the plan.
    #[serde(default)]
    pub total_blocks: usize,

    /// Run-level error, if the run aborted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Execution-bearing fields of one block, captured at split time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSnapshot {
    /// Hash of the block's authoring fields when the snapshot was taken.
    pub content_hash: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_finished_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<serde_json::Value>,
}

/// The execution half of a project.
///
/// Carries a full copy of the project so a snapshot file is itself a
/// valid, independently executable project, plus the per-block captures
/// keyed by block id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    #[serde(default = "default_version")]
    pub version: String,

    /// Run-level metadata.
    #[serde(default)]
    pub execution: ExecutionMeta,

    /// Captured execution fields keyed by block id.
    pub blocks: BTreeMap<BlockId, BlockSnapshot>,

    /// Full project copy, outputs included.
    pub project: Project,
}

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

/// Options controlling [`merge`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// Skip blocks whose current content hash no longer matches the hash
    /// recorded at split time. Their captured outputs are dropped.
    pub skip_mismatched: bool,
}

/// Split a project into (source, snapshot).
///
/// The source copy has every execution field cleared; the snapshot holds
/// the captured fields of every executable block keyed by id, with the
/// content hash of the block's authoring fields at split time.
pub fn split(project: &Project) -> (Project, ProjectSnapshot) {
    let mut blocks = BTreeMap::new();
    for notebook in &project.notebooks {
        for block in &notebook.blocks {
            if !block.is_executable() {
                continue;
            }
            blocks.insert(
                block.id.clone(),
                BlockSnapshot {
                    content_hash: block.content_hash(),
                    execution_count: block.execution_count,
                    execution_started_at: block.execution_started_at,
                    execution_finished_at: block.execution_finished_at,
                    outputs: block.outputs.clone(),
                },
            );
        }
    }

    let mut source = project.clone();
    for notebook in &mut source.notebooks {
        for block in &mut notebook.blocks {
            block.clear_execution_fields();
        }
    }

    let snapshot = ProjectSnapshot {
        version: FORMAT_VERSION.to_string(),
        execution: ExecutionMeta::default(),
        blocks,
        project: project.clone(),
    };

    (source, snapshot)
}

/// Merge a snapshot's captured outputs back into a source project.
///
/// For every block present in both, the source block's current content
/// hash is recomputed. When it matches the recorded hash, or when
/// `skip_mismatched` is false, the snapshot's execution fields are copied
/// onto the merged copy. A mismatched block with `skip_mismatched` set is
/// left untouched; its stale outputs are dropped rather than carried over.
pub fn merge(source: &Project, snapshot: &ProjectSnapshot, options: MergeOptions) -> Project {
    let mut merged = source.clone();
    for notebook in &mut merged.notebooks {
        for block in &mut notebook.blocks {
            let Some(captured) = snapshot.blocks.get(&block.id) else {
                continue;
            };
            if options.skip_mismatched && block.content_hash() != captured.content_hash {
                log::debug!(
                    "skipping stale outputs for block {} (content changed since split)",
                    block.id
                );
                continue;
            }
            block.execution_count = captured.execution_count;
            block.execution_started_at = captured.execution_started_at;
            block.execution_finished_at = captured.execution_finished_at;
            block.outputs = captured.outputs.clone();
        }
    }
    merged
}

impl ProjectSnapshot {
    /// Load a snapshot from a YAML or JSON file, selected by extension.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    /// Save the snapshot, format selected by extension.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        let serialized = if path.extension().and_then(|e| e.to_str()) == Some("json") {
            serde_json::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self)?
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| CoreError::IoWithPath {
                    path: parent.display().to_string(),
                    source: e,
                })?;
            }
        }
        std::fs::write(path, serialized).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(())
    }

    /// File name for this snapshot: `<slug>_<projectId>_<stamp>.snapshot.<ext>`.
    pub fn file_name(&self, latest: bool, ext: &str) -> String {
        let stamp = if latest {
            "latest".to_string()
        } else {
            self.execution
                .finished_at
                .unwrap_or_else(Utc::now)
                .format(STAMP_FORMAT)
                .to_string()
        };
        format!(
            "{}_{}_{}.snapshot.{}",
            self.project.slug(),
            self.project.id,
            stamp,
            ext
        )
    }
}

/// Reference to a snapshot file on disk, parsed from the name convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRef {
    pub path: PathBuf,
    pub slug: String,
    pub project_id: String,
    /// `None` means the `latest` stamp.
    pub timestamp: Option<DateTime<Utc>>,
}

impl SnapshotRef {
    /// Parse `<slug>_<projectId>_<timestamp|"latest">.snapshot.<ext>`.
    ///
    /// Slugs never contain `_`, so splitting on it from the right is
    /// unambiguous.
    pub fn parse(path: &Path) -> CoreResult<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| CoreError::BadSnapshotName {
                name: path.display().to_string(),
            })?;
        let bad = || CoreError::BadSnapshotName {
            name: name.to_string(),
        };

        let stem = name
            .strip_suffix(".snapshot.yaml")
            .or_else(|| name.strip_suffix(".snapshot.yml"))
            .or_else(|| name.strip_suffix(".snapshot.json"))
            .ok_or_else(bad)?;

        let (rest, stamp) = stem.rsplit_once('_').ok_or_else(bad)?;
        let (slug, project_id) = rest.rsplit_once('_').ok_or_else(bad)?;
        if slug.is_empty() || project_id.is_empty() || stamp.is_empty() {
            return Err(bad());
        }

        let timestamp = if stamp == "latest" {
            None
        } else {
            let naive = chrono::NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT)
                .map_err(|_| bad())?;
            Some(naive.and_utc())
        };

        Ok(Self {
            path: path.to_path_buf(),
            slug: slug.to_string(),
            project_id: project_id.to_string(),
            timestamp,
        })
    }

    /// Whether this is the `latest` snapshot.
    pub fn is_latest(&self) -> bool {
        self.timestamp.is_none()
    }
}

/// Find snapshot files for a project in a directory, newest first.
///
/// The `latest` stamp sorts before timestamped snapshots. Files that do
/// not match the naming convention are ignored.
pub fn find_snapshots(dir: &Path, project_id: &str) -> CoreResult<Vec<SnapshotRef>> {
    let mut refs = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })? {
        let entry = entry.map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Ok(snapshot_ref) = SnapshotRef::parse(&path) else {
            continue;
        };
        if snapshot_ref.project_id == project_id {
            refs.push(snapshot_ref);
        }
    }
    // `latest` first, then newest timestamp first
    refs.sort_by(|a, b| match (&a.timestamp, &b.timestamp) {
        (None, None) => a.path.cmp(&b.path),
        (None, Some(_)) => std::cmp::Ordering::Less,
        (Some(_), None) => std::cmp::Ordering::Greater,
        (Some(ta), Some(tb)) => tb.cmp(ta),
    });
    Ok(refs)
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod tests;
