//! Rendering and JSON serialization for parsed query trees.
//!
//! Everything here consumes a tree through its read-only accessors; the
//! query crate itself knows nothing about wire formats.

use std::process::ExitCode;

use serde::Serialize;
use sift_query::{NodeRef, Tree};

/// JSON mirror of a tree node, built by walking the accessors.
#[derive(Serialize)]
pub struct WireNode {
    /// Canonical verb symbol; omitted for the implicit should.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub verb: String,
    /// Leaf phrase; omitted on subqueries.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phrase: String,
    /// Child nodes; omitted on leaves.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<WireNode>,
}

impl WireNode {
    /// Builds the wire form of a subtree.
    fn from_node(node: NodeRef<'_>) -> Self {
        Self {
            verb: node.verb().symbol().to_string(),
            phrase: node.phrase().to_string(),
            children: node.children().map(Self::from_node).collect(),
        }
    }

    /// Builds the wire form of a whole tree.
    ///
    /// An invalid tree is unrepresentable and yields `None` rather than
    /// partial structure.
    pub fn from_tree(tree: &Tree) -> Option<Self> {
        tree.is_valid().then(|| Self::from_node(tree.root()))
    }
}

/// JSON form of a single leaf term.
#[derive(Serialize)]
pub struct WireLeaf {
    /// Human readable verb.
    pub verb: String,
    /// The leaf's phrase.
    pub phrase: String,
}

/// Collects the wire form of every leaf, in the tree's breadth-first
/// leaf order.
pub fn wire_leaves(tree: &Tree) -> Vec<WireLeaf> {
    tree.leaves()
        .iter()
        .map(|leaf| WireLeaf {
            verb: leaf.verb().human().to_string(),
            phrase: leaf.phrase().to_string(),
        })
        .collect()
}

/// Serializes a value as pretty JSON on stdout.
pub fn print_json(value: &impl Serialize) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Renders a tree as an indented outline, one node per line.
pub fn render_tree(tree: &Tree) -> String {
    let mut out = String::new();
    render_node(tree.root(), 0, &mut out);
    out
}

/// Recursive worker for [`render_tree`].
fn render_node(node: NodeRef<'_>, indent: usize, out: &mut String) {
    let prefix = "  ".repeat(indent);
    if node.is_leaf() {
        out.push_str(&format!("{prefix}{} {:?}\n", node.verb(), node.phrase()));
    } else {
        out.push_str(&format!("{prefix}{} [\n", node.verb()));
        for child in node.children() {
            render_node(child, indent + 1, out);
        }
        out.push_str(&format!("{prefix}]\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_query::parse;

    #[test]
    fn wire_node_skips_empty_fields() {
        let tree = parse("x +[+y -z]").unwrap();
        let wire = WireNode::from_tree(&tree).unwrap();
        let json = serde_json::to_string(&wire).unwrap();

        // The root is an implicit should with no phrase.
        assert!(json.starts_with("{\"children\""));
        assert!(json.contains("\"verb\":\"+\""));
        assert!(json.contains("\"verb\":\"-\""));
        assert!(json.contains("\"phrase\":\"x\""));
        assert!(!json.contains("\"verb\":\"\""));
    }

    #[test]
    fn invalid_tree_is_unrepresentable() {
        let tree = sift_query::Tree::new();
        assert!(WireNode::from_tree(&tree).is_none());
    }

    #[test]
    fn rendered_outline_shape() {
        let tree = parse("x +[+y -z]").unwrap();
        let rendered = render_tree(&tree);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "should [");
        assert_eq!(lines[1], "  should \"x\"");
        assert_eq!(lines[2], "  must [");
        assert_eq!(lines[3], "    must \"y\"");
        assert_eq!(lines[4], "    must not \"z\"");
        assert_eq!(lines[5], "  ]");
        assert_eq!(lines[6], "]");
    }

    #[test]
    fn leaf_wire_order() {
        let tree = parse("a [b c] d").unwrap();
        let leaves = wire_leaves(&tree);
        let phrases: Vec<&str> = leaves.iter().map(|l| l.phrase.as_str()).collect();
        assert_eq!(phrases, vec!["a", "d", "b", "c"]);
    }
}
