//! Indented text rendering of a syntax tree

use std::fmt::Write;

use super::Node;

/// Render `root` one node per line, two spaces of indent per depth.
///
/// Each line is the node kind, followed by `: attribute` when present.
pub fn dump(root: &Node) -> String {
    let mut out = String::new();
    let mut stack = vec![(root, 0)];
    while let Some((node, depth)) = stack.pop() {
        let indent = "  ".repeat(depth);
        let _ = match node.attribute() {
            Some(attr) => writeln!(out, "{indent}{}: {attr}", node.kind),
            None => writeln!(out, "{indent}{}", node.kind),
        };
        stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
    }
    out
}
