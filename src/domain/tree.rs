//! Dependency tree collection
//!
//! Owns the items, the authoritative flat order and the most recently
//! assembled tree. Callers populate it with items and edges, then call
//! [`DependencyTree::build`] to reorder the flat list and assemble the tree.

use std::fmt;
use thiserror::Error;
use tracing::debug;

use super::forest::{self, TreeNode};
use super::id::ParentRef;
use super::item::Item;
use super::order::{self, BuildOptions, BuildStage, Pass};
use super::render;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("Item {0} must not be empty")]
    EmptyIdentifier(&'static str),

    #[error("Item with id or name '{0}' already exists")]
    DuplicateIdentity(String),

    #[error("'{0}' is reserved for top-level items")]
    ReservedIdentifier(String),

    #[error("Item '{item}' already depends on '{dependency}'")]
    DuplicateDependencyDeclaration { item: String, dependency: String },

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Self-dependency not allowed: {0}")]
    SelfDependency(String),

    #[error("Dependency '{dependency}' of item '{item}' was not found")]
    UnresolvedDependency { item: String, dependency: String },

    #[error("Cannot shift from {from} to {to} in a sequence of {len} items")]
    IndexOutOfRange { from: usize, to: usize, len: usize },

    #[error("Ordering did not converge: {pass} pass exceeded {cap} iterations")]
    OrderingDidNotConverge { pass: Pass, cap: usize },

    #[error("Conflicting constraints on '{item}': {detail}")]
    ConflictingConstraints { item: String, detail: String },
}

/// A collection of interdependent items
pub struct DependencyTree<T> {
    items: Vec<Item<T>>,
    tree: Vec<TreeNode>,
    options: BuildOptions,
    stage: BuildStage,
}

impl<T> Default for DependencyTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DependencyTree<T> {
    /// Creates an empty collection with default build options
    pub fn new() -> Self {
        Self::with_options(BuildOptions::default())
    }

    pub fn with_options(options: BuildOptions) -> Self {
        Self {
            items: Vec::new(),
            tree: Vec::new(),
            options,
            stage: BuildStage::Initial,
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: BuildOptions) {
        self.options = options;
    }

    /// Last stage the most recent build completed
    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    /// Adds a top-level item
    pub fn add_root_item(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        payload: T,
    ) -> Result<&mut Item<T>, TreeError> {
        self.insert(Item::new(id, name, payload)?)
    }

    /// Adds an item below an existing parent (by id or name)
    ///
    /// The root sentinel as `parent` adds a top-level item.
    pub fn add_item(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        parent: &str,
        payload: T,
    ) -> Result<&mut Item<T>, TreeError> {
        let mut item = Item::new(id, name, payload)?;
        item.set_parent(parent);
        self.insert(item)
    }

    /// Inserts a prepared item at the end of the flat order
    ///
    /// A non-root parent must already exist; the item is appended to the
    /// parent's children and its parent reference is set to the parent's id.
    pub fn insert(&mut self, mut item: Item<T>) -> Result<&mut Item<T>, TreeError> {
        if let Some(existing) = self.items.iter().find(|i| i.collides_with(&item)) {
            let clash = if existing.matches(item.id()) {
                item.id()
            } else {
                item.name()
            };
            return Err(TreeError::DuplicateIdentity(clash.to_string()));
        }

        if let ParentRef::Item(key) = item.parent().clone() {
            let parent_idx = self
                .get_item_index(&key)
                .ok_or_else(|| TreeError::ItemNotFound(key.clone()))?;
            let parent = &mut self.items[parent_idx];
            parent.add_child(item.id());
            item.set_parent(ParentRef::Item(parent.id().to_string()));
        }

        debug!(id = item.id(), parent = %item.parent(), "adding item");
        self.items.push(item);
        let last = self.items.len() - 1;
        Ok(&mut self.items[last])
    }

    /// Declares that `item` must come after `dependency` (ids or names)
    pub fn depends_on(&mut self, item: &str, dependency: &str) -> Result<(), TreeError> {
        let item_idx = self
            .get_item_index(item)
            .ok_or_else(|| TreeError::ItemNotFound(item.to_string()))?;
        let dep_idx = self
            .get_item_index(dependency)
            .ok_or_else(|| TreeError::ItemNotFound(dependency.to_string()))?;

        if item_idx == dep_idx {
            return Err(TreeError::SelfDependency(item.to_string()));
        }

        let dep_id = self.items[dep_idx].id().to_string();
        let item_id = self.items[item_idx].id().to_string();
        self.items[item_idx].depends_on(dep_id)?;
        self.items[dep_idx].add_required_by(item_id);

        Ok(())
    }

    /// Removes an item together with everything below it
    ///
    /// Returns the removed items in flat order. Dependencies declared on a
    /// removed item are kept and fail the next build as unresolved.
    pub fn remove_item(&mut self, key: &str) -> Result<Vec<Item<T>>, TreeError> {
        let idx = self
            .get_item_index(key)
            .ok_or_else(|| TreeError::ItemNotFound(key.to_string()))?;

        let mut doomed = vec![self.items[idx].id().to_lowercase()];
        let mut cursor = 0;
        while cursor < doomed.len() {
            if let Some(pos) = self.get_item_index(&doomed[cursor]) {
                doomed.extend(self.items[pos].children().iter().map(|c| c.to_lowercase()));
            }
            cursor += 1;
        }

        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| doomed.contains(&item.id().to_lowercase()));
        self.items = kept;

        for item in &mut self.items {
            for gone in &removed {
                item.drop_child(gone.id());
                item.drop_required_by(gone.id());
            }
        }

        debug!(key, removed = removed.len(), "removed items");
        Ok(removed)
    }

    /// Removes all items
    pub fn clear(&mut self) {
        self.items.clear();
        self.tree.clear();
        self.stage = BuildStage::Initial;
    }

    pub fn get_item(&self, key: &str) -> Option<&Item<T>> {
        self.items.iter().find(|item| item.matches(key))
    }

    pub fn get_item_mut(&mut self, key: &str) -> Option<&mut Item<T>> {
        self.items.iter_mut().find(|item| item.matches(key))
    }

    /// Current position of an item in the flat order
    pub fn get_item_index(&self, key: &str) -> Option<usize> {
        order::index_of(&self.items, key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get_item_index(key).is_some()
    }

    /// Items hanging directly below `parent`, in flat order
    ///
    /// `parent` is the root sentinel or the id or name of an item.
    pub fn get_items_by_parent(&self, parent: &str) -> Vec<&Item<T>> {
        let parent_name = self.get_item(parent).map(|p| p.name());
        self.items
            .iter()
            .filter(|item| item.is_child_of(parent, parent_name))
            .collect()
    }

    /// Children of an item in declared order; empty if the item is unknown
    pub fn get_item_children(&self, key: &str) -> Vec<&Item<T>> {
        self.get_item(key)
            .map(|item| {
                item.children()
                    .iter()
                    .filter_map(|child| self.get_item(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Resolves the declared dependencies of an item
    pub fn dependencies_of(&self, key: &str) -> Result<Vec<&Item<T>>, TreeError> {
        let item = self
            .get_item(key)
            .ok_or_else(|| TreeError::ItemNotFound(key.to_string()))?;

        item.dependencies()
            .iter()
            .map(|dependency| {
                self.get_item(dependency)
                    .ok_or_else(|| TreeError::UnresolvedDependency {
                        item: item.id().to_string(),
                        dependency: dependency.clone(),
                    })
            })
            .collect()
    }

    /// The authoritative order
    pub fn flat_list(&self) -> &[Item<T>] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item<T>> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Reorders the flat list and assembles the tree
    ///
    /// On error the flat order is left as the failing pass found it and the
    /// previous tree is discarded.
    pub fn build(&mut self) -> Result<&[Item<T>], TreeError> {
        debug!(order = ?self.ids(), "dependency tree before build");

        self.tree.clear();
        order::arrange(&mut self.items, &self.options, &mut self.stage)?;
        self.tree = forest::assemble(&self.items);
        self.stage = BuildStage::TreeAssembled;

        debug!(order = ?self.ids(), "dependency tree after build");
        Ok(&self.items)
    }

    /// Checks both ordering invariants against the current flat order
    pub fn verify(&self) -> Result<(), TreeError> {
        order::verify(&self.items)
    }

    /// Reassembles the tree from the current flat order
    pub fn tree(&mut self) -> &[TreeNode] {
        self.tree = forest::assemble(&self.items);
        &self.tree
    }

    /// The tree assembled by the last build or [`tree`](Self::tree) call
    pub fn last_tree(&self) -> &[TreeNode] {
        &self.tree
    }

    /// The item a tree node stands for
    pub fn item_for(&self, node: &TreeNode) -> Option<&Item<T>> {
        self.get_item(&node.id)
    }

    /// Renders the last assembled tree
    pub fn render(&self) -> String {
        render::render(&self.tree)
    }

    /// Ids in flat order
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id()).collect()
    }

    /// Depth-first flatten of a forest back into item ids
    pub fn flatten(forest: &[TreeNode]) -> Vec<&str> {
        forest::flatten(forest)
            .into_iter()
            .map(|node| node.id.as_str())
            .collect()
    }
}

impl<T> fmt::Display for DependencyTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl<T: fmt::Debug> fmt::Debug for DependencyTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyTree")
            .field("items", &self.items)
            .field("options", &self.options)
            .field("stage", &self.stage)
            .finish()
    }
}
