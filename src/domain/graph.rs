//! Relation graph of a collection
//!
//! A read-only view over the dependency and parent edges of a
//! [`DependencyTree`], used for relation queries and DOT export.
//! Uses petgraph for graph operations.

use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;
use std::fmt;

use super::tree::{DependencyTree, TreeError};

/// Kind of relation an edge stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Dependency -> dependent
    Dependency,
    /// Parent -> child
    Child,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EdgeKind::Dependency => "depends",
            EdgeKind::Child => "child",
        })
    }
}

/// Directed graph over item ids
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Node weights are item names
    graph: DiGraph<String, EdgeKind>,

    /// Map from lowercased item id to node index
    node_map: HashMap<String, NodeIndex>,

    /// Canonical ids by node index
    ids: Vec<String>,
}

impl DependencyGraph {
    /// Builds the graph from a collection
    ///
    /// Fails if a declared dependency or listed child is not in the collection.
    pub fn from_tree<T>(tree: &DependencyTree<T>) -> Result<Self, TreeError> {
        let mut graph = Self::default();

        // First pass: add all nodes
        for item in tree.iter() {
            let idx = graph.graph.add_node(item.name().to_string());
            graph.node_map.insert(item.id().to_lowercase(), idx);
            graph.ids.push(item.id().to_string());
        }

        // Second pass: add all edges
        for item in tree.iter() {
            let item_idx = graph.index(item.id())?;

            for dependency in item.dependencies() {
                let dep_idx = tree
                    .get_item(dependency)
                    .and_then(|dep| graph.node_map.get(&dep.id().to_lowercase()).copied())
                    .ok_or_else(|| TreeError::UnresolvedDependency {
                        item: item.id().to_string(),
                        dependency: dependency.clone(),
                    })?;
                graph.graph.add_edge(dep_idx, item_idx, EdgeKind::Dependency);
            }

            for child in item.children() {
                let child_idx = graph.index(child)?;
                graph.graph.add_edge(item_idx, child_idx, EdgeKind::Child);
            }
        }

        Ok(graph)
    }

    fn index(&self, id: &str) -> Result<NodeIndex, TreeError> {
        self.node_map
            .get(&id.to_lowercase())
            .copied()
            .ok_or_else(|| TreeError::ItemNotFound(id.to_string()))
    }

    fn neighbors(&self, id: &str, kind: EdgeKind, direction: Direction) -> Vec<&str> {
        let Ok(idx) = self.index(id) else {
            return vec![];
        };

        let mut found: Vec<&str> = self
            .graph
            .edges_directed(idx, direction)
            .filter(|edge| *edge.weight() == kind)
            .map(|edge| match direction {
                Direction::Incoming => edge.source(),
                Direction::Outgoing => edge.target(),
            })
            .map(|idx| self.ids[idx.index()].as_str())
            .collect();
        // petgraph walks edges newest first
        found.reverse();
        found
    }

    /// Direct dependencies of an item
    pub fn dependencies(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, EdgeKind::Dependency, Direction::Incoming)
    }

    /// Items that declared a dependency on this item
    pub fn dependents(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, EdgeKind::Dependency, Direction::Outgoing)
    }

    /// Graphviz rendering; child edges are dashed
    pub fn to_dot(&self) -> String {
        let dot = Dot::with_attr_getters(
            &self.graph,
            &[Config::EdgeNoLabel],
            &|_, edge| match edge.weight() {
                EdgeKind::Dependency => String::new(),
                EdgeKind::Child => "style = dashed".to_string(),
            },
            &|_, _| String::new(),
        );
        format!("{}", dot)
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_map.contains_key(&id.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
