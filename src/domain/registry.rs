//! Per-payload-type collection factory
//!
//! A caller-owned registry handing out one shared [`DependencyTree`] per
//! payload type. Asking twice for the same type yields the same collection.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::order::BuildOptions;
use super::tree::DependencyTree;

/// Shared handle to a collection
pub type SharedTree<T> = Arc<Mutex<DependencyTree<T>>>;

#[derive(Debug, Default)]
pub struct Registry {
    options: BuildOptions,
    trees: Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose new collections use `options`
    pub fn with_options(options: BuildOptions) -> Self {
        Self {
            options,
            trees: Mutex::default(),
        }
    }

    /// Returns the collection for payload type `T`, creating it on first use
    pub fn get_or_create<T: Send + 'static>(&self) -> SharedTree<T> {
        let mut trees = self.lock();
        let key = TypeId::of::<T>();

        if let Some(tree) = trees
            .get(&key)
            .and_then(|entry| entry.downcast_ref::<SharedTree<T>>())
        {
            return Arc::clone(tree);
        }

        let tree: SharedTree<T> = Arc::new(Mutex::new(DependencyTree::with_options(self.options)));
        trees.insert(key, Box::new(Arc::clone(&tree)));
        tree
    }

    /// Returns the collection for `T` if one was created
    pub fn get<T: Send + 'static>(&self) -> Option<SharedTree<T>> {
        self.lock()
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<SharedTree<T>>())
            .map(Arc::clone)
    }

    /// Forgets the collection for `T`; existing handles stay usable
    pub fn remove<T: Send + 'static>(&self) -> bool {
        self.lock().remove(&TypeId::of::<T>()).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TypeId, Box<dyn Any + Send + Sync>>> {
        self.trees.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plugin;
    struct Route;

    #[test]
    fn same_type_shares_collection() {
        let registry = Registry::new();

        let first = registry.get_or_create::<Plugin>();
        first.lock().unwrap().add_root_item("a", "A", Plugin).unwrap();

        let second = registry.get_or_create::<Plugin>();
        assert_eq!(second.lock().unwrap().len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn types_get_separate_collections() {
        let registry = Registry::new();
        registry
            .get_or_create::<Plugin>()
            .lock()
            .unwrap()
            .add_root_item("a", "A", Plugin)
            .unwrap();

        assert!(registry.get_or_create::<Route>().lock().unwrap().is_empty());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn new_collections_use_registry_options() {
        let options = BuildOptions {
            max_passes: 7,
            window_pass: false,
        };
        let registry = Registry::with_options(options);

        let tree = registry.get_or_create::<Route>();
        assert_eq!(tree.lock().unwrap().options(), &options);
    }

    #[test]
    fn remove_forgets_collection() {
        let registry = Registry::new();
        assert!(registry.get::<Plugin>().is_none());

        registry.get_or_create::<Plugin>();
        assert!(registry.get::<Plugin>().is_some());
        assert!(registry.remove::<Plugin>());
        assert!(!registry.remove::<Plugin>());
        assert!(registry.is_empty());
    }
}
