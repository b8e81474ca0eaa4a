//! Project: the top-level `.deepnote` document.
//!
//! One project per file, persisted as YAML (the `.deepnote` default) or
//! JSON, nested under a top-level `project` key with a format version.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::path::Path;

use crate::block::Block;
use crate::error::{CoreError, CoreResult};
use crate::notebook::Notebook;

/// Current project file format version.
pub const FORMAT_VERSION: &str = "1";

/// A named external connection referenced by SQL blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Integration {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub integration_type: String,
}

/// An ordered collection of notebooks plus project-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project id.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Notebooks in project order.
    #[serde(default)]
    pub notebooks: Vec<Notebook>,

    /// Named external connections referenced by SQL blocks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integrations: Vec<Integration>,

    /// Open project-level settings, passed through opaquely.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, serde_json::Value>,
}

/// On-disk wrapper: `{ version, project }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    #[serde(default = "default_version")]
    pub version: String,
    pub project: Project,
}

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

impl Project {
    /// Create an empty project.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            notebooks: Vec::new(),
            integrations: Vec::new(),
            settings: BTreeMap::new(),
        }
    }

    /// Load a project from a YAML or JSON file, selected by extension.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ProjectNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let file: ProjectFile = match extension_of(path)? {
            FileKind::Yaml => serde_yaml::from_str(&content)?,
            FileKind::Json => serde_json::from_str(&content)?,
        };
        let project = file.project;
        project.validate()?;
        Ok(project)
    }

    /// Save the project atomically, format selected by extension.
    ///
    /// Uses write-to-temp-then-rename to prevent corruption; the temp file
    /// includes the PID to avoid races from concurrent processes.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        let file = ProjectFile {
            version: FORMAT_VERSION.to_string(),
            project: self.clone(),
        };
        let serialized = match extension_of(path)? {
            FileKind::Yaml => serde_yaml::to_string(&file)?,
            FileKind::Json => serde_json::to_string_pretty(&file)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| CoreError::IoWithPath {
                    path: parent.display().to_string(),
                    source: e,
                })?;
            }
        }
        let temp_path = path.with_extension(format!("tmp.{}", std::process::id()));
        std::fs::write(&temp_path, &serialized).map_err(|e| CoreError::IoWithPath {
            path: temp_path.display().to_string(),
            source: e,
        })?;
        std::fs::rename(&temp_path, path).map_err(|e| {
            let _ = std::fs::remove_file(&temp_path);
            CoreError::IoWithPath {
                path: path.display().to_string(),
                source: e,
            }
        })?;
        Ok(())
    }

    /// Check project-level invariants (block ids unique across the project).
    pub fn validate(&self) -> CoreResult<()> {
        let mut seen: HashSet<&str> = HashSet::new();
        for notebook in &self.notebooks {
            for block in &notebook.blocks {
                if !seen.insert(block.id.as_str()) {
                    return Err(CoreError::DuplicateBlockId {
                        id: block.id.to_string(),
                        notebook: notebook.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Find a notebook by exact id, then by name.
    pub fn get_notebook(&self, id_or_name: &str) -> Option<&Notebook> {
        self.notebooks
            .iter()
            .find(|n| n.id == id_or_name)
            .or_else(|| self.notebooks.iter().find(|n| n.name == id_or_name))
    }

    /// Find a block anywhere in the project, returning its notebook too.
    pub fn find_block(&self, id: &str) -> Option<(&Notebook, &Block)> {
        for notebook in &self.notebooks {
            if let Some(block) = notebook.get_block(id) {
                return Some((notebook, block));
            }
        }
        None
    }

    /// Find a block mutably anywhere in the project.
    pub fn find_block_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.notebooks
            .iter_mut()
            .find_map(|n| n.get_block_mut(id))
    }

    /// Look up an integration by id.
    pub fn get_integration(&self, id: &str) -> Option<&Integration> {
        self.integrations.iter().find(|i| i.id == id)
    }

    /// Filesystem-friendly slug of the project name, used in snapshot
    /// file names.
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        for c in self.name.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.ends_with('-') && !slug.is_empty() {
                slug.push('-');
            }
        }
        let slug = slug.trim_end_matches('-').to_string();
        if slug.is_empty() {
            "project".to_string()
        } else {
            slug
        }
    }
}

/// Environment variable name bound to an integration id.
///
/// Convention: `SQL_` + the id upper-cased, with every non-alphanumeric
/// character replaced by `_`.
pub fn integration_env_var(integration_id: &str) -> String {
    let mut name = String::with_capacity(integration_id.len() + 4);
    name.push_str("SQL_");
    for c in integration_id.chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_uppercase());
        } else {
            name.push('_');
        }
    }
    name
}

enum FileKind {
    Yaml,
    Json,
}

fn extension_of(path: &Path) -> CoreResult<FileKind> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("deepnote") | Some("yaml") | Some("yml") => Ok(FileKind::Yaml),
        Some("json") => Ok(FileKind::Json),
        other => Err(CoreError::UnsupportedExtension {
            path: path.display().to_string(),
            extension: other.unwrap_or("").to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
