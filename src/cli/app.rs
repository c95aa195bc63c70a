//! Main CLI application structure

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{inspect, layout};
use crate::domain::DependencyTree;
use crate::storage::{self, Config, Project};

#[derive(Parser)]
#[command(name = "deptree")]
#[command(author, version, about = "Dependency-aware ordering and tree layout for interdependent items")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Manifest to load instead of the project's
    #[arg(long, short = 'm', global = true, env = "DEPTREE_MANIFEST")]
    pub manifest: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new deptree project with a sample manifest
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Build and print the flat order
    Order,

    /// Build and print the item tree
    Tree,

    /// Show one item and its relations
    Show {
        /// Item id or name
        item: String,
    },

    /// List the items directly below a parent
    Children {
        /// Parent id or name, or "root" for top-level items
        #[arg(default_value = "root")]
        parent: String,
    },

    /// Build and report whether every constraint holds
    Check,

    /// Export dependency and parent edges as Graphviz DOT
    Graph,
}

/// Manifest and configuration a command works on
pub struct Session {
    pub config: Config,
    pub manifest: PathBuf,
}

impl Session {
    /// Resolves the manifest from `--manifest` or the current project
    pub fn open(manifest: Option<&Path>) -> Result<Self> {
        match manifest {
            Some(path) => Ok(Self {
                config: Config::load()?,
                manifest: path.to_path_buf(),
            }),
            None => {
                let project = Project::open_current()?;
                Ok(Self {
                    manifest: project.manifest_path(),
                    config: project.config().clone(),
                })
            }
        }
    }

    /// Loads the manifest into an unordered collection
    pub fn load_tree(&self) -> Result<DependencyTree<()>> {
        debug!(manifest = %self.manifest.display(), "loading items");
        storage::load_tree(&self.manifest, &self.config)
            .with_context(|| format!("Failed to load {}", self.manifest.display()))
    }
}

/// Installs the stderr log subscriber
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    debug!("deptree starting");

    if let Commands::Init { path } = &cli.command {
        let output = Output::new(cli.format.unwrap_or_default());
        let project = Project::init(path)?;
        debug!(dir = %project.project_dir().display(), "created project directory");
        output.success(&format!(
            "Initialized deptree project at {}",
            project.root().display()
        ));
        return Ok(());
    }

    let session = Session::open(cli.manifest.as_deref())?;
    let format = cli
        .format
        .unwrap_or_else(|| session.config.output_format().into());
    let output = Output::new(format);

    match cli.command {
        Commands::Init { .. } => {}
        Commands::Order => layout::order(&output, &session)?,
        Commands::Tree => layout::tree(&output, &session)?,
        Commands::Check => layout::check(&output, &session)?,
        Commands::Graph => layout::graph(&session)?,
        Commands::Show { item } => inspect::show(&output, &session, &item)?,
        Commands::Children { parent } => inspect::children(&output, &session, &parent)?,
    }

    debug!("command completed successfully");
    Ok(())
}
