//! Layout commands (order, tree, check, graph)
//!
//! These commands build the manifest's items and print the result.

use anyhow::{Context, Result};
use tracing::debug;

use super::app::Session;
use super::output::Output;
use crate::domain::{DependencyGraph, DependencyTree};

fn build(session: &Session) -> Result<DependencyTree<()>> {
    let mut tree = session.load_tree()?;

    if let Err(err) = tree.build() {
        debug!(stage = %tree.stage(), "build failed");
        return Err(anyhow::Error::new(err).context("Build failed"));
    }

    debug!(items = tree.len(), "build complete");
    Ok(tree)
}

/// Print the flat order
pub fn order(output: &Output, session: &Session) -> Result<()> {
    let tree = build(session)?;

    if output.is_json() {
        let items: Vec<_> = tree
            .iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::json!({
                    "index": index,
                    "id": item.id(),
                    "name": item.name(),
                    "parent": item.parent(),
                    "dependencies": item.dependencies(),
                })
            })
            .collect();
        output.data(&items);
    } else if tree.is_empty() {
        println!("No items.");
    } else {
        println!("{:<4} {:<20} NAME", "#", "ID");
        println!("{}", "-".repeat(60));
        for (index, item) in tree.iter().enumerate() {
            println!("{:<4} {:<20} {}", index, item.id(), item.name());
        }
    }

    Ok(())
}

/// Print the rendered tree
pub fn tree(output: &Output, session: &Session) -> Result<()> {
    let tree = build(session)?;

    if output.is_json() {
        output.data(&tree.last_tree());
    } else if tree.is_empty() {
        println!("No items.");
    } else {
        println!("{}", tree.render());
    }

    Ok(())
}

/// Build and report the outcome
pub fn check(output: &Output, session: &Session) -> Result<()> {
    let tree = build(session)?;
    tree.verify().context("Ordering invariants violated")?;

    output.success(&format!("OK: {} items ordered", tree.len()));
    Ok(())
}

/// Print declared relations as DOT
pub fn graph(session: &Session) -> Result<()> {
    let tree = session.load_tree()?;
    let graph = DependencyGraph::from_tree(&tree)?;

    debug!(nodes = graph.len(), edges = graph.edge_count(), "exporting graph");
    print!("{}", graph.to_dot());
    Ok(())
}
