//! Item manifests
//!
//! A manifest lists items in declaration order. It can be written as TOML,
//! JSON or YAML; the format is picked from the file extension.
//!
//! ```toml
//! [[item]]
//! id = "db"
//! name = "Database"
//! depends_on = ["network"]
//! [item.metadata]
//! port = 5432
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{BuildOptions, DependencyTree, TreeError};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Unsupported manifest format: {0} (expected toml, json, yaml or yml)")]
    UnsupportedFormat(String),

    #[error("Failed to read manifest {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse manifest {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid manifest entry '{item}': {source}")]
    Item {
        item: String,
        #[source]
        source: TreeError,
    },
}

/// Serialization format of a manifest file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Toml,
    Json,
    Yaml,
}

impl ManifestFormat {
    /// Picks the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_lowercase();

        match ext.as_str() {
            "toml" => Ok(ManifestFormat::Toml),
            "json" => Ok(ManifestFormat::Json),
            "yaml" | "yml" => Ok(ManifestFormat::Yaml),
            _ => Err(ManifestError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// One entry of a manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestItem {
    pub id: String,

    /// Display name; defaults to the id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Id or name of an item declared earlier in the manifest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ManifestItem {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub item: Vec<ManifestItem>,
}

impl Manifest {
    /// Reads a manifest, picking the format from the extension
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let format = ManifestFormat::from_path(path)?;
        let content = fs::read_to_string(path).map_err(|e| ManifestError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let manifest = Self::parse(&content, format).map_err(|message| ManifestError::Parse {
            path: path.display().to_string(),
            message,
        })?;

        debug!(path = %path.display(), items = manifest.item.len(), "loaded manifest");
        Ok(manifest)
    }

    /// Parses manifest text in the given format
    pub fn parse(content: &str, format: ManifestFormat) -> Result<Self, String> {
        match format {
            ManifestFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            ManifestFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            ManifestFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        }
    }

    /// Builds an unordered collection from the manifest
    ///
    /// Items are inserted in file order, then all dependencies are declared,
    /// so dependencies may point forward in the file.
    pub fn into_tree(self, options: BuildOptions) -> Result<DependencyTree<()>, ManifestError> {
        let mut tree = DependencyTree::with_options(options);

        for entry in &self.item {
            let wrap = |source: TreeError| ManifestError::Item {
                item: entry.id.clone(),
                source,
            };

            let parent = entry.parent.as_deref().unwrap_or(crate::domain::ROOT);
            let item = tree
                .add_item(entry.id.as_str(), entry.display_name(), parent, ())
                .map_err(wrap)?;
            for (key, value) in &entry.metadata {
                item.set_property(key.as_str(), value.clone());
            }
        }

        for entry in &self.item {
            for dependency in &entry.depends_on {
                tree.depends_on(&entry.id, dependency)
                    .map_err(|source| ManifestError::Item {
                        item: entry.id.clone(),
                        source,
                    })?;
            }
        }

        Ok(tree)
    }

    /// Small example written by `deptree init`
    pub fn sample() -> Self {
        let entry = |id: &str, name: &str, parent: Option<&str>, deps: &[&str]| ManifestItem {
            id: id.to_string(),
            name: Some(name.to_string()),
            parent: parent.map(str::to_string),
            depends_on: deps.iter().map(|d| d.to_string()).collect(),
            metadata: serde_json::Map::new(),
        };

        Self {
            item: vec![
                entry("api", "API", None, &["db"]),
                entry("db", "Database", None, &["network"]),
                entry("network", "Network", None, &[]),
                entry("api_auth", "Auth", Some("api"), &[]),
                entry("api_billing", "Billing", Some("api"), &[]),
            ],
        }
    }

    pub fn to_toml(&self) -> Result<String, ManifestError> {
        toml::to_string_pretty(self).map_err(|e| ManifestError::Parse {
            path: "<sample>".to_string(),
            message: e.to_string(),
        })
    }
}
