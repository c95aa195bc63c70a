//! Text rendering of an assembled tree
//!
//! One line per node, depth-first, with branch glyphs and a running guide
//! prefix. The layout is used for golden-output comparisons, so the glyph
//! and prefix rules below must not change:
//!
//! ```text
//! ┌─ item 1
//! ├─ item 2
//! |  ├─ item 2 Child 1
//! |  └─ item 2 Child 2
//! └─ item 3
//!    └─ item 3 Child 1
//! ```

use super::forest::TreeNode;

const FIRST: &str = "┌─ ";
const GUIDE: &str = "|  ";
const MIDDLE: &str = "├─ ";
const LAST: &str = "└─ ";

/// Renders a forest, one line per node
pub fn render(forest: &[TreeNode]) -> String {
    render_lines(forest).join("\n")
}

/// Renders a forest into individual lines
pub fn render_lines(forest: &[TreeNode]) -> Vec<String> {
    let mut lines = Vec::new();
    render_level(forest, 0, String::new(), &mut lines);
    lines
}

fn render_level(nodes: &[TreeNode], level: usize, mut prefix: String, lines: &mut Vec<String>) {
    let spacer = if level > 0 { prefix.clone() } else { String::new() };

    for (idx, node) in nodes.iter().enumerate() {
        let mut line = spacer.clone();
        if level > 0 && !line.starts_with('|') {
            line.push(' ');
        }

        if idx == 0 {
            line.push_str(match (level, nodes.len()) {
                (0, _) => FIRST,
                (_, 1) => LAST,
                _ => MIDDLE,
            });
            prefix.push_str(GUIDE);
        } else if idx == nodes.len() - 1 {
            line.push_str(LAST);
            prefix = if node.has_children() && level > 0 {
                shrink(&prefix, level)
            } else {
                "  ".repeat(level + 1)
            };
        } else {
            line.push_str(MIDDLE);
        }

        line.push_str(&node.name);
        lines.push(line);
        render_level(&node.children, level + 1, prefix.clone(), lines);
    }
}

/// Drops the innermost guide of `prefix` and pads for the next level
fn shrink(prefix: &str, level: usize) -> String {
    let trimmed = prefix.trim();
    let keep = trimmed.len().saturating_sub(2);
    format!("{}{}", &trimmed[..keep], "  ".repeat(level + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str) -> TreeNode {
        node(name, vec![])
    }

    fn node(name: &str, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            id: name.to_lowercase().replace(' ', "_"),
            name: name.to_string(),
            children,
        }
    }

    #[test]
    fn empty_forest_renders_nothing() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn single_root_uses_first_glyph() {
        assert_eq!(render(&[leaf("item 1")]), "┌─ item 1");
    }

    #[test]
    fn siblings_get_first_middle_last() {
        let forest = vec![leaf("a"), leaf("b"), leaf("c")];
        assert_eq!(render(&forest), "┌─ a\n├─ b\n└─ c");
    }

    #[test]
    fn last_root_children_are_indented_without_guide() {
        let forest = vec![
            leaf("a"),
            node("b", vec![leaf("b 1"), leaf("b 2")]),
        ];
        assert_eq!(render(&forest), "┌─ a\n└─ b\n   ├─ b 1\n   └─ b 2");
    }

    #[test]
    fn single_child_keeps_guide() {
        let forest = vec![node("solo", vec![node("only child", vec![leaf("x"), leaf("y")])])];
        let expected = "┌─ solo\n|  └─ only child\n|  |  ├─ x\n|  |  └─ y";
        assert_eq!(render(&forest), expected);
    }

    #[test]
    fn shrink_drops_innermost_guide() {
        assert_eq!(shrink("|  |  ", 1), "|     ");
        assert_eq!(shrink("   |  ", 1), "    ");
        assert_eq!(shrink("|", 2), "      ");
    }
}
