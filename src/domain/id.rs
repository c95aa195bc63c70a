//! Item identity and parent references
//!
//! Every item carries an id and a name. A lookup key addresses an item when
//! it equals either of them, compared case-insensitively. Both must be
//! unique across a collection.
//!
//! Parents are referenced through [`ParentRef`]: either the root sentinel or
//! the canonical id of another item in the same collection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key used for top-level items when grouping by parent
pub const ROOT: &str = "root";

/// Case-insensitive identity comparison
pub fn same_identity(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Returns true if `key` addresses an item with the given id or name
pub fn matches_key(id: &str, name: &str, key: &str) -> bool {
    same_identity(id, key) || same_identity(name, key)
}

/// Where an item hangs in the hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParentRef {
    /// Top-level item
    #[default]
    Root,
    /// Child of the item with this canonical id
    Item(String),
}

impl ParentRef {
    /// Returns true for top-level items
    pub fn is_root(&self) -> bool {
        matches!(self, ParentRef::Root)
    }

    /// Returns the parent id, or None for top-level items
    pub fn id(&self) -> Option<&str> {
        match self {
            ParentRef::Root => None,
            ParentRef::Item(id) => Some(id),
        }
    }

    /// Grouping key used by the tree assembler
    pub fn key(&self) -> &str {
        match self {
            ParentRef::Root => ROOT,
            ParentRef::Item(id) => id,
        }
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl From<String> for ParentRef {
    fn from(value: String) -> Self {
        if value.is_empty() || same_identity(&value, ROOT) {
            ParentRef::Root
        } else {
            ParentRef::Item(value)
        }
    }
}

impl From<&str> for ParentRef {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}

impl From<ParentRef> for String {
    fn from(parent: ParentRef) -> Self {
        parent.key().to_string()
    }
}
