//! Configuration handling for deptree
//!
//! Configuration is stored in `.deptree/config.toml` (project) and
//! `~/.config/deptree/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::BuildOptions;

/// Name of the project directory
pub const PROJECT_DIR: &str = ".deptree";

/// Default manifest file name inside the project directory
pub const DEFAULT_MANIFEST: &str = "items.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Manifest path, relative to `.deptree/`
    pub manifest: String,

    /// Overrides the global output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<OutputFormat>,

    /// Ordering engine tunables
    pub build: BuildOptions,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            manifest: DEFAULT_MANIFEST.to_string(),
            default_format: None,
            build: BuildOptions::default(),
        }
    }
}

impl ProjectConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.manifest.trim().is_empty() {
            return Err(ConfigError::Invalid("manifest must not be empty".to_string()));
        }
        if self.build.max_passes == 0 {
            return Err(ConfigError::Invalid(
                "build.max_passes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project_root = Self::find_project_root();
        let project = match &project_root {
            Some(root) => Self::load_project_config(root)?,
            None => ProjectConfig::default(),
        };

        Ok(Self {
            project,
            global,
            project_root,
        })
    }

    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "deptree", "deptree").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(PROJECT_DIR).join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;
        config.validate().context("Invalid project config")?;

        Ok(config)
    }

    /// Finds the project root by looking for `.deptree/` from the current directory up
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    /// Finds the project root by looking for `.deptree/` from `start` up
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Returns the project root, or an error if not in a project
    pub fn require_project_root(&self) -> Result<&Path> {
        self.project_root
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not in a deptree project. Run 'deptree init' first."))
    }

    /// Output format from the project, falling back to the global setting
    pub fn output_format(&self) -> OutputFormat {
        self.project
            .default_format
            .unwrap_or(self.global.default_format)
    }

    /// Saves the project configuration
    pub fn save_project(&self) -> Result<()> {
        let root = self.require_project_root()?;
        let config_path = root.join(PROJECT_DIR).join("config.toml");

        let content =
            toml::to_string_pretty(&self.project).context("Failed to serialize project config")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write project config: {}", config_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config {
            project: ProjectConfig::default(),
            global: GlobalConfig::default(),
            project_root: None,
        };

        assert_eq!(config.project.manifest, "items.toml");
        assert_eq!(config.project.build.max_passes, 1000);
        assert!(config.project.build.window_pass);
        assert_eq!(config.output_format(), OutputFormat::Text);
    }

    #[test]
    fn parse_project_config() {
        let toml = r#"
manifest = "services.yaml"
default_format = "json"

[build]
max_passes = 50
window_pass = false
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.manifest, "services.yaml");
        assert_eq!(config.default_format, Some(OutputFormat::Json));
        assert_eq!(config.build.max_passes, 50);
        assert!(!config.build.window_pass);
    }

    #[test]
    fn partial_build_section_keeps_defaults() {
        let config: ProjectConfig = toml::from_str("[build]\nwindow_pass = false\n").unwrap();
        assert_eq!(config.build.max_passes, 1000);
        assert_eq!(config.manifest, "items.toml");
    }

    #[test]
    fn parse_global_config() {
        let config: GlobalConfig = toml::from_str("default_format = \"json\"\n").unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
    }

    #[test]
    fn project_format_overrides_global() {
        let config = Config {
            project: ProjectConfig {
                default_format: Some(OutputFormat::Text),
                ..ProjectConfig::default()
            },
            global: GlobalConfig {
                default_format: OutputFormat::Json,
            },
            project_root: None,
        };

        assert_eq!(config.output_format(), OutputFormat::Text);
    }

    #[test]
    fn find_project_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(PROJECT_DIR)).unwrap();

        let sub_dir = dir.path().join("sub").join("dir");
        fs::create_dir_all(&sub_dir).unwrap();

        let root = Config::find_project_root_from(&sub_dir);
        assert_eq!(root.as_deref(), Some(dir.path()));
    }

    #[test]
    fn zero_passes_rejected() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(PROJECT_DIR)).unwrap();
        fs::write(
            dir.path().join(PROJECT_DIR).join("config.toml"),
            "[build]\nmax_passes = 0\n",
        )
        .unwrap();

        assert!(Config::load_project_config(dir.path()).is_err());
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(PROJECT_DIR)).unwrap();
        fs::write(dir.path().join(PROJECT_DIR).join("config.toml"), "manifest = [").unwrap();

        assert!(Config::load_project_config(dir.path()).is_err());
    }

    #[test]
    fn config_not_in_project() {
        let config = Config {
            project: ProjectConfig::default(),
            global: GlobalConfig::default(),
            project_root: None,
        };

        assert!(config.require_project_root().is_err());
    }
}
