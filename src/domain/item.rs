//! Item domain model
//!
//! An item is a named node the engine arranges. It carries a caller-chosen
//! payload it never inspects, its declared dependencies, the reverse index
//! of items that depend on it, its place in the hierarchy and free-form
//! metadata.

use serde_json::{Map, Value};
use std::fmt;

use super::id::{matches_key, same_identity, ParentRef, ROOT};
use super::tree::TreeError;

/// Callback invoked when the contiguity pass moves an item
pub type ShiftCallback = Box<dyn FnMut() + Send>;

/// A node in a dependency tree
pub struct Item<T> {
    id: String,
    name: String,
    payload: T,
    dependencies: Vec<String>,
    required_by: Vec<String>,
    parent: ParentRef,
    children: Vec<String>,
    properties: Map<String, Value>,
    on_shift: Option<ShiftCallback>,
}

impl<T> Item<T> {
    /// Creates a top-level item
    ///
    /// Both `id` and `name` must be non-empty, and neither may be the root
    /// sentinel.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        payload: T,
    ) -> Result<Self, TreeError> {
        let id = id.into();
        let name = name.into();

        if id.trim().is_empty() {
            return Err(TreeError::EmptyIdentifier("id"));
        }
        if name.trim().is_empty() {
            return Err(TreeError::EmptyIdentifier("name"));
        }
        if let Some(reserved) = [&id, &name].into_iter().find(|key| same_identity(key, ROOT)) {
            return Err(TreeError::ReservedIdentifier(reserved.clone()));
        }

        Ok(Self {
            id,
            name,
            payload,
            dependencies: Vec::new(),
            required_by: Vec::new(),
            parent: ParentRef::Root,
            children: Vec::new(),
            properties: Map::new(),
            on_shift: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut T {
        &mut self.payload
    }

    /// Consumes the item and returns its payload
    pub fn into_payload(self) -> T {
        self.payload
    }

    /// Returns true if `key` is this item's id or name
    pub fn matches(&self, key: &str) -> bool {
        matches_key(&self.id, &self.name, key)
    }

    /// Returns true if either key of one item addresses the other
    pub fn collides_with<U>(&self, other: &Item<U>) -> bool {
        other.matches(&self.id) || other.matches(&self.name)
    }

    /// Declared dependencies, in declaration order
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Declares that this item must come after `id_or_name`
    ///
    /// Fails if the same dependency is already declared.
    pub fn depends_on(&mut self, id_or_name: impl Into<String>) -> Result<(), TreeError> {
        let id_or_name = id_or_name.into();
        if self.depends_on_key(&id_or_name) {
            return Err(TreeError::DuplicateDependencyDeclaration {
                item: self.id.clone(),
                dependency: id_or_name,
            });
        }

        self.dependencies.push(id_or_name);
        Ok(())
    }

    /// Returns true if a dependency with this id or name is declared
    pub fn depends_on_key(&self, key: &str) -> bool {
        self.dependencies.iter().any(|d| same_identity(d, key))
    }

    /// Ids of items that declared a dependency on this item (or hang below it)
    pub fn required_by(&self) -> &[String] {
        &self.required_by
    }

    /// Records a dependent; duplicates are ignored
    pub fn add_required_by(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.required_by.iter().any(|r| same_identity(r, &id)) {
            self.required_by.push(id);
        }
    }

    pub(crate) fn drop_required_by(&mut self, id: &str) {
        self.required_by.retain(|r| !same_identity(r, id));
    }

    pub fn parent(&self) -> &ParentRef {
        &self.parent
    }

    /// Sets the parent reference without touching any children list
    pub fn set_parent(&mut self, parent: impl Into<ParentRef>) {
        self.parent = parent.into();
    }

    /// Returns true if this item hangs below `key`
    ///
    /// `key` may be the root sentinel, or the id or name of the parent item;
    /// `parent_name` is the parent's name as known to the collection.
    pub fn is_child_of(&self, key: &str, parent_name: Option<&str>) -> bool {
        match &self.parent {
            ParentRef::Root => same_identity(ROOT, key),
            ParentRef::Item(id) => {
                same_identity(id, key) || parent_name.is_some_and(|n| same_identity(n, key))
            }
        }
    }

    /// Ids of direct children, in declared order
    pub fn children(&self) -> &[String] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Appends a child id and records it as a dependent
    pub(crate) fn add_child(&mut self, child_id: impl Into<String>) {
        let child_id = child_id.into();
        self.add_required_by(child_id.clone());
        self.children.push(child_id);
    }

    pub(crate) fn drop_child(&mut self, child_id: &str) {
        self.children.retain(|c| !same_identity(c, child_id));
    }

    /// Metadata lookup; returns `default` when the key is absent
    pub fn get_property(&self, key: &str, default: Value) -> Value {
        self.properties.get(key).cloned().unwrap_or(default)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn remove_property(&mut self, key: &str) -> Option<Value> {
        self.properties.remove(key)
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Registers a callback run each time the contiguity pass moves this item
    pub fn on_shift(&mut self, callback: impl FnMut() + Send + 'static) {
        self.on_shift = Some(Box::new(callback));
    }

    pub(crate) fn notify_shift(&mut self) {
        if let Some(callback) = self.on_shift.as_mut() {
            callback();
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Item<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("payload", &self.payload)
            .field("dependencies", &self.dependencies)
            .field("required_by", &self.required_by)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("properties", &self.properties)
            .field("on_shift", &self.on_shift.is_some())
            .finish()
    }
}
