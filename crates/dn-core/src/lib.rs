//! dn-core - Core library for deepnote-flow
//!
//! This crate provides the `.deepnote` project data model (projects,
//! notebooks, blocks), content checksums, project file I/O, and the
//! snapshot split/merge model used across all deepnote-flow components.

pub mod block;
pub mod block_id;
pub mod checksum;
pub mod error;
pub mod notebook;
pub mod project;
pub mod snapshot;

pub use block::{Block, BlockMetadata, BlockType};
pub use block_id::BlockId;
pub use checksum::compute_checksum_parts;
pub use error::{CoreError, CoreResult};
pub use notebook::{ExecutionMode, Notebook};
pub use project::{integration_env_var, Integration, Project, ProjectFile};
pub use snapshot::{
    find_snapshots, merge, split, BlockSnapshot, ExecutionMeta, MergeOptions, ProjectSnapshot,
    SnapshotRef,
};
