//! Domain models for deptree
//!
//! Contains the ordering engine and data model without any I/O concerns.

mod id;
mod item;
mod tree;
mod graph;
mod registry;
pub mod order;
pub mod forest;
pub mod render;

pub use id::{matches_key, same_identity, ParentRef, ROOT};
pub use item::{Item, ShiftCallback};
pub use tree::{DependencyTree, TreeError};
pub use graph::{DependencyGraph, EdgeKind};
pub use registry::{Registry, SharedTree};
pub use order::{BuildOptions, BuildStage, Pass, DEFAULT_MAX_PASSES};
pub use forest::TreeNode;
