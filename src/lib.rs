//! deptree - dependency-aware ordering for named, interdependent items
//!
//! Items declare which other items they must follow and may hang below a
//! parent item. A build rearranges the flat list so every item comes after
//! its dependencies and every parent is immediately followed by its
//! subtree, then assembles and renders the nested view.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{BuildOptions, DependencyTree, Item, Registry, TreeError, TreeNode};
