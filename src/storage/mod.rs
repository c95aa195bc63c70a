//! # Storage Layer
//!
//! Configuration and manifest files of a deptree project.
//!
//! ## Project Structure
//!
//! ```text
//! .deptree/
//! ├── config.toml     # Project configuration
//! └── items.toml      # Item manifest (toml, json or yaml)
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a deptree project
//! - [`Manifest`] - Items, parents and dependencies as declared on disk
//! - [`Config`] - Project and global configuration

mod config;
mod manifest;
mod project;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, PROJECT_DIR};
pub use manifest::{Manifest, ManifestError, ManifestFormat, ManifestItem};
pub use project::{load_tree, Project, ProjectError};
