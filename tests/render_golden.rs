//! Golden tests for the rendered tree
//!
//! These tests pin the exact text layout, glyphs and guide prefixes
//! included, for hierarchies built through the public API.

use deptree::domain::render;
use deptree::{DependencyTree, TreeNode};

/// Adds the subtree of item 2, in deliberately scrambled declaration order
fn add_item_2_subtree(tree: &mut DependencyTree<u32>) {
    tree.add_item("item_2b", "item 2 Child 2", "item_2", 22).unwrap();
    tree.add_item("item_2a", "item 2 Child 1", "item_2", 21).unwrap();
    tree.add_item("item_2c", "item 2 Child 3", "item_2", 23).unwrap();
    tree.add_item("item_2a2", "item 2 Child 1 Child 2", "item_2a", 212).unwrap();
    tree.add_item("item_2a1", "item 2 Child 1 Child 1", "item_2a", 211).unwrap();
    tree.add_item("item_2c2", "item 2 Child 3 Child 2", "item_2c", 232).unwrap();
    tree.add_item("item_2c1", "item 2 Child 3 Child 1", "item_2c", 231).unwrap();
}

fn complex_tree() -> DependencyTree<u32> {
    let mut tree = DependencyTree::new();

    tree.add_root_item("item_6", "item 6", 6).unwrap();
    tree.add_root_item("item_4", "item 4", 4).unwrap();
    tree.add_item("item_6b", "item 6 Child 2", "item_6", 62).unwrap();
    tree.add_item("item_6a", "item 6 Child 1", "item_6", 61).unwrap();
    tree.add_root_item("item_1", "item 1", 1).unwrap();
    tree.add_root_item("item_3", "item 3", 3).unwrap();
    tree.add_root_item("item_2", "item 2", 2).unwrap();
    tree.add_root_item("item_5", "item 5", 5).unwrap();
    add_item_2_subtree(&mut tree);
    tree.add_item("item_4a", "item 4 Child 1", "item_4", 41).unwrap();

    tree.depends_on("item_6", "item_5").unwrap();
    tree.depends_on("item_5", "item_4").unwrap();
    tree.depends_on("item_4", "item_3").unwrap();
    tree.depends_on("item_3", "item_2").unwrap();
    tree.depends_on("item_2", "item_1").unwrap();

    tree
}

const COMPLEX: &str = "\
┌─ item 1
├─ item 2
|  ├─ item 2 Child 2
|  ├─ item 2 Child 1
|  |  ├─ item 2 Child 1 Child 2
|  |  └─ item 2 Child 1 Child 1
|  └─ item 2 Child 3
|     ├─ item 2 Child 3 Child 2
|     └─ item 2 Child 3 Child 1
├─ item 3
├─ item 4
|  └─ item 4 Child 1
├─ item 5
└─ item 6
   ├─ item 6 Child 2
   └─ item 6 Child 1";

const SINGLE_ROOT: &str = "\
┌─ item 2
|  ├─ item 2 Child 2
|  ├─ item 2 Child 1
|  |  ├─ item 2 Child 1 Child 2
|  |  └─ item 2 Child 1 Child 1
|  └─ item 2 Child 3
|     ├─ item 2 Child 3 Child 2
|     └─ item 2 Child 3 Child 1";

#[test]
fn complex_hierarchy_flat_order() {
    let mut tree = complex_tree();
    tree.build().unwrap();

    assert_eq!(
        tree.ids(),
        [
            "item_1", "item_2", "item_2b", "item_2a", "item_2a2", "item_2a1", "item_2c",
            "item_2c2", "item_2c1", "item_3", "item_4", "item_4a", "item_5", "item_6",
            "item_6b", "item_6a",
        ]
    );
}

#[test]
fn complex_hierarchy_renders() {
    let mut tree = complex_tree();
    tree.build().unwrap();

    assert_eq!(tree.render(), COMPLEX);
}

#[test]
fn single_root_renders() {
    let mut tree = DependencyTree::new();
    tree.add_root_item("item_2", "item 2", 2).unwrap();
    add_item_2_subtree(&mut tree);
    tree.build().unwrap();

    assert_eq!(tree.render(), SINGLE_ROOT);
}

#[test]
fn render_lines_match_tree_size() {
    let mut tree = complex_tree();
    tree.build().unwrap();

    let lines = render::render_lines(tree.last_tree());
    assert_eq!(lines.len(), tree.len());
    assert!(lines.iter().all(|line| line.contains("item")));
}

#[test]
fn render_before_build_is_empty() {
    let tree = complex_tree();
    assert_eq!(tree.render(), "");
}

#[test]
fn forest_serializes_without_empty_children() {
    let mut tree = DependencyTree::new();
    tree.add_root_item("a", "A", ()).unwrap();
    tree.add_item("b", "B", "a", ()).unwrap();
    tree.build().unwrap();

    let json = serde_json::to_value(tree.last_tree()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{"id": "a", "name": "A", "children": [{"id": "b", "name": "B"}]}])
    );

    let nodes: &[TreeNode] = tree.last_tree();
    assert!(nodes[0].has_children());
}
