//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `init` | Create `.deptree/` with a config and sample manifest |
//! | `order` | Build and print the flat order |
//! | `tree` | Build and print the rendered tree |
//! | `show`, `children` | Inspect items and their relations |
//! | `check` | Build and verify, failing on any violated constraint |
//! | `graph` | Export declared relations as Graphviz DOT |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug logging on stderr:
//! ```bash
//! deptree --verbose order
//! ```
//! Without it, `RUST_LOG` controls the log level.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod layout;
mod inspect;

pub use app::{run, Cli, Commands, Session};
pub use output::{Output, OutputFormat};
