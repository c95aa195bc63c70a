//! Item inspection commands (show, children)

use anyhow::Result;

use super::app::Session;
use super::output::Output;
use crate::domain::{same_identity, TreeError, ROOT};

fn list_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

/// Show one item and its relations
pub fn show(output: &Output, session: &Session, key: &str) -> Result<()> {
    let tree = session.load_tree()?;
    let item = tree
        .get_item(key)
        .ok_or_else(|| TreeError::ItemNotFound(key.to_string()))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": item.id(),
            "name": item.name(),
            "parent": item.parent(),
            "dependencies": item.dependencies(),
            "required_by": item.required_by(),
            "children": item.children(),
            "metadata": item.properties(),
        }));
        return Ok(());
    }

    println!("{:<13} {}", "ID:", item.id());
    println!("{:<13} {}", "Name:", item.name());
    println!("{:<13} {}", "Parent:", item.parent());
    println!("{:<13} {}", "Depends on:", list_or_dash(item.dependencies()));
    println!("{:<13} {}", "Required by:", list_or_dash(item.required_by()));
    println!("{:<13} {}", "Children:", list_or_dash(item.children()));

    if !item.properties().is_empty() {
        let mut entries: Vec<_> = item.properties().iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        println!("Metadata:");
        for (key, value) in entries {
            println!("  {} = {}", key, value);
        }
    }

    Ok(())
}

/// List the items grouped under a parent, in built order
pub fn children(output: &Output, session: &Session, parent: &str) -> Result<()> {
    let mut tree = session.load_tree()?;
    if !same_identity(parent, ROOT) && !tree.contains(parent) {
        return Err(TreeError::ItemNotFound(parent.to_string()).into());
    }
    tree.build()?;

    let children = tree.get_items_by_parent(parent);

    if output.is_json() {
        let items: Vec<_> = children
            .iter()
            .map(|item| {
                serde_json::json!({
                    "id": item.id(),
                    "name": item.name(),
                    "children": item.children().len(),
                })
            })
            .collect();
        output.data(&items);
    } else if children.is_empty() {
        println!("No items below '{}'.", parent);
    } else {
        println!("{:<20} NAME", "ID");
        println!("{}", "-".repeat(40));
        for item in children {
            println!("{:<20} {}", item.id(), item.name());
        }
    }

    Ok(())
}
