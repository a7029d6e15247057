//! Project manifest (`package.json`) reading
//!
//! Only the dependency names matter here: declared dependencies are left as
//! unresolved imports when bundling, so they are loaded from the project's
//! installed packages at run time.

use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{ConfigError, Result};

pub const MANIFEST_FILE_NAME: &str = "package.json";

/// Module names kept external when bundling, in manifest order
pub type ExternalModuleSet = IndexSet<String>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    /// Absent and `null` both mean no dependencies
    #[serde(default)]
    pub dependencies: Option<IndexMap<String, serde_json::Value>>,

    #[serde(default)]
    pub dev_dependencies: Option<IndexMap<String, serde_json::Value>>,
}

impl PackageManifest {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|source| {
            ConfigError::InvalidManifest {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
    }

    pub fn parse(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Runtime and development dependency names
    pub fn dependency_names(&self) -> ExternalModuleSet {
        self.dependencies
            .iter()
            .chain(self.dev_dependencies.iter())
            .flat_map(|deps| deps.keys())
            .cloned()
            .collect()
    }
}

/// Resolve the external module names for a project
///
/// Reads `package.json` from `project_dir`, or from the working directory
/// when no directory is given. A missing manifest is only an error when the
/// directory was given explicitly.
pub fn resolve_externals(project_dir: Option<&Path>) -> Result<ExternalModuleSet> {
    let dir = match project_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    let manifest_path = dir.join(MANIFEST_FILE_NAME);

    if manifest_path.is_file() {
        let manifest = PackageManifest::from_file(&manifest_path)?;
        let externals = manifest.dependency_names();
        debug!(
            "Resolved {} external module(s) from {}",
            externals.len(),
            manifest_path.display()
        );
        return Ok(externals);
    }

    if project_dir.is_some() {
        return Err(ConfigError::ManifestNotFound { dir }.into());
    }

    Ok(ExternalModuleSet::new())
}
