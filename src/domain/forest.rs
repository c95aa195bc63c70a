//! Tree assembly
//!
//! Turns the ordered flat sequence into a nested forest by grouping items
//! under their parent, starting from the root sentinel. Each item is placed
//! at most once, so the result is acyclic even if parent references were
//! edited by hand.

use serde::Serialize;
use std::collections::HashSet;

use super::id::ROOT;
use super::item::Item;

/// A node of the assembled tree
///
/// Nodes carry identity and display name only; the item itself, with its
/// payload and metadata, stays owned by the collection and is reached
/// through [`DependencyTree::item_for`](super::DependencyTree::item_for).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Groups `items` by parent, preserving their relative order within a parent
pub fn assemble<T>(items: &[Item<T>]) -> Vec<TreeNode> {
    let mut placed = HashSet::new();
    group(items, None, &mut placed)
}

fn group<T>(items: &[Item<T>], parent: Option<&Item<T>>, placed: &mut HashSet<String>) -> Vec<TreeNode> {
    let members: Vec<&Item<T>> = items
        .iter()
        .filter(|item| match parent {
            None => item.is_child_of(ROOT, None),
            Some(p) => item.is_child_of(p.id(), Some(p.name())),
        })
        .filter(|item| placed.insert(item.id().to_lowercase()))
        .collect();

    members
        .into_iter()
        .map(|item| TreeNode {
            id: item.id().to_string(),
            name: item.name().to_string(),
            children: group(items, Some(item), placed),
        })
        .collect()
}

/// Depth-first (pre-order) walk over a forest
pub fn flatten(forest: &[TreeNode]) -> Vec<&TreeNode> {
    let mut out = Vec::new();
    let mut stack: Vec<&TreeNode> = forest.iter().rev().collect();

    while let Some(node) = stack.pop() {
        out.push(node);
        stack.extend(node.children.iter().rev());
    }

    out
}
