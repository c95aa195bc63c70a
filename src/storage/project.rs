//! Project management
//!
//! Handles project initialization and loading the manifest of a project.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::{Config, PROJECT_DIR};
use super::manifest::Manifest;
use crate::domain::DependencyTree;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a deptree project. Run 'deptree init' first.")]
    NotInProject,

    #[error("Manifest not found: {0}")]
    MissingManifest(PathBuf),
}

const DEFAULT_CONFIG: &str = r#"# deptree configuration

# Manifest listing the items, relative to this directory (toml, json or yaml)
manifest = "items.toml"

# Output format: "text" or "json"
# default_format = "text"

[build]
# Iteration cap for each ordering pass
max_passes = 1000

# Group items that share their highest dependency
window_pass = true
"#;

/// A deptree project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    ///
    /// Existing files are left untouched.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let project_dir = root.join(PROJECT_DIR);

        fs::create_dir_all(&project_dir).with_context(|| {
            format!("Failed to create {} directory: {}", PROJECT_DIR, project_dir.display())
        })?;

        let config_path = project_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let project = Self::open(root)?;

        let manifest_path = project.manifest_path();
        if !manifest_path.exists() {
            let sample = Manifest::sample().to_toml()?;
            fs::write(&manifest_path, sample).with_context(|| {
                format!("Failed to write manifest: {}", manifest_path.display())
            })?;
        }

        Ok(project)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .deptree directory path
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path of the configured manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.project_dir().join(&self.config.project.manifest)
    }

    /// Loads the manifest into an unordered collection
    pub fn load_tree(&self) -> Result<DependencyTree<()>> {
        load_tree(&self.manifest_path(), &self.config)
    }
}

/// Loads a manifest file with the build options of `config`
pub fn load_tree(path: &Path, config: &Config) -> Result<DependencyTree<()>> {
    if !path.is_file() {
        return Err(ProjectError::MissingManifest(path.to_path_buf()).into());
    }

    let tree = Manifest::load(path)?.into_tree(config.project.build)?;
    Ok(tree)
}
