//! The parsed query tree.
//!
//! Nodes live in a [`generational_arena::Arena`] owned by the [`Tree`];
//! parent links are plain arena indices rather than owning pointers, so
//! the structure stays a strict ownership hierarchy rooted at the tree
//! wrapper. Read access goes through the borrowed [`NodeRef`] view.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use generational_arena::{Arena, Index};

use crate::symbol::Role;
use crate::verb::Verb;

/// Opaque handle to a node inside its owning [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

/// The stored record for a single node.
#[derive(Debug, Clone)]
struct NodeData {
    /// Arena index of the owning node; `None` for the root.
    parent: Option<Index>,
    /// Arena indices of the children, in left-to-right input order.
    children: Vec<Index>,
    /// Modal verb applied to this node relative to its parent.
    verb: Verb,
    /// Literal text; non-empty exactly when the node is a leaf.
    phrase: String,
}

impl NodeData {
    /// A fresh internal node with no phrase.
    fn internal(parent: Option<Index>, verb: Verb) -> Self {
        Self {
            parent,
            children: Vec::new(),
            verb,
            phrase: String::new(),
        }
    }

    /// Local validity: verb in range and leaf ⇔ non-empty phrase.
    fn is_locally_valid(&self) -> bool {
        self.verb.is_valid() && (self.children.is_empty() != self.phrase.is_empty())
    }
}

/// A parsed search query tree.
///
/// A tree is semantically defined entirely by its root node; the wrapper
/// owns the node arena and exposes whole-tree operations. Trees are
/// produced by [`crate::parse`] (or by the builder methods, for tests and
/// tooling) and treated as immutable afterwards.
#[derive(Debug, Clone)]
pub struct Tree {
    /// Backing store for all nodes of this tree.
    arena: Arena<NodeData>,
    /// Index of the root node; always present.
    root: Index,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Creates a tree holding a single childless, phrase-less root.
    ///
    /// Such a tree is not yet valid; it becomes valid once the root gains
    /// a phrase-bearing leaf structure beneath it (or is replaced by one).
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(NodeData::internal(None, Verb::Should));
        Self { arena, root }
    }

    /// Handle of the root node.
    pub fn root_id(&self) -> NodeId {
        NodeId(self.root)
    }

    /// Borrowed view of the root node.
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            id: self.root,
        }
    }

    /// Borrowed view of an arbitrary node, or `None` for a stale handle.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.arena.get(id.0).map(|_| NodeRef { tree: self, id: id.0 })
    }

    /// Appends a new leaf under `parent` and returns its handle.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this tree.
    pub fn add_leaf(&mut self, parent: NodeId, verb: Verb, phrase: impl Into<String>) -> NodeId {
        let idx = self.arena.insert(NodeData {
            parent: Some(parent.0),
            children: Vec::new(),
            verb,
            phrase: phrase.into(),
        });
        self.arena[parent.0].children.push(idx);
        NodeId(idx)
    }

    /// Appends a new internal (subquery) node under `parent` and returns
    /// its handle.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this tree.
    pub fn add_child(&mut self, parent: NodeId, verb: Verb) -> NodeId {
        let idx = self.arena.insert(NodeData::internal(Some(parent.0), verb));
        self.arena[parent.0].children.push(idx);
        NodeId(idx)
    }

    /// Number of children currently under `id`.
    pub(crate) fn child_count(&self, id: NodeId) -> usize {
        self.arena[id.0].children.len()
    }

    /// The sole child of `id`, if it has exactly one.
    pub(crate) fn only_child(&self, id: NodeId) -> Option<NodeId> {
        match self.arena[id.0].children.as_slice() {
            [child] => Some(NodeId(*child)),
            _ => None,
        }
    }

    /// Parent handle of `id`, `None` for the root.
    pub(crate) fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id.0].parent.map(NodeId)
    }

    /// The stored verb of `id`, without the defensive validity mapping.
    pub(crate) fn verb_of(&self, id: NodeId) -> Verb {
        self.arena[id.0].verb
    }

    /// Overwrites the verb of `id`.
    pub(crate) fn set_verb(&mut self, id: NodeId, verb: Verb) {
        self.arena[id.0].verb = verb;
    }

    /// Replaces `node` with its sole child in the parent's child list and
    /// discards `node`. Returns the hoisted child, or `None` when `node`
    /// is the root or does not have exactly one child.
    ///
    /// The caller decides what happens to the verbs involved.
    pub(crate) fn hoist_only_child(&mut self, node: NodeId) -> Option<NodeId> {
        let child = self.only_child(node)?;
        let parent = self.arena[node.0].parent?;
        let slot = self.arena[parent]
            .children
            .iter()
            .position(|&c| c == node.0)?;

        self.arena[parent].children[slot] = child.0;
        self.arena[child.0].parent = Some(parent);
        self.arena.remove(node.0);
        Some(child)
    }

    /// Replaces the root by its sole child, if it has exactly one.
    ///
    /// This is the final collapse step of parsing: a one-element query
    /// such as `[[golang]]` promotes down to the bare `golang` tree.
    pub(crate) fn promote_root(&mut self) {
        let Some(child) = self.only_child(self.root_id()) else {
            return;
        };
        self.arena[child.0].parent = None;
        self.arena.remove(self.root);
        self.root = child.0;
    }

    /// Checks the node invariants recursively over the whole tree:
    /// verbs are in range, leaves and only leaves carry phrases, every
    /// child's recorded parent is the node holding it, and no node is
    /// reachable twice (no cycles, no shared subtrees).
    pub fn is_valid(&self) -> bool {
        let mut seen = HashSet::new();
        self.subtree_valid(self.root, None, &mut seen)
    }

    /// Recursive worker for [`Tree::is_valid`].
    fn subtree_valid(&self, idx: Index, parent: Option<Index>, seen: &mut HashSet<Index>) -> bool {
        if !seen.insert(idx) {
            return false;
        }
        let Some(node) = self.arena.get(idx) else {
            return false;
        };
        node.parent == parent
            && node.is_locally_valid()
            && node
                .children
                .iter()
                .all(|&child| self.subtree_valid(child, Some(idx), seen))
    }

    /// Collects every leaf, breadth first, left to right within each
    /// level. A tree whose root is itself a leaf yields just the root.
    pub fn leaves(&self) -> Vec<NodeRef<'_>> {
        let root = self.root();
        if root.is_leaf() {
            return vec![root];
        }

        let mut found = Vec::new();
        let mut queue: VecDeque<NodeRef<'_>> = root.children().collect();
        while let Some(node) = queue.pop_front() {
            if node.is_leaf() {
                found.push(node);
            } else {
                queue.extend(node.children());
            }
        }
        found
    }

    /// The maximum depth among the tree's leaves. A tree that is a single
    /// leaf (or an empty root) has height zero.
    pub fn height(&self) -> usize {
        self.leaves().iter().map(|leaf| leaf.depth()).max().unwrap_or(0)
    }

    /// Structural equality: both trees valid, same verb and phrase at
    /// every matching position, same child counts throughout.
    ///
    /// An invalid tree equals nothing, itself included.
    pub fn equals(&self, other: &Self) -> bool {
        self.is_valid() && other.is_valid() && self.root().equals(other.root())
    }

    /// The canonical query-string form of the whole tree.
    ///
    /// Re-parsing this string yields a structurally equal tree; it is not
    /// guaranteed to reproduce the originally parsed text byte for byte.
    pub fn canonical_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root())
    }
}

/// A borrowed, read-only view of one node in a [`Tree`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    /// The owning tree.
    tree: &'a Tree,
    /// Arena index of the viewed node.
    id: Index,
}

impl<'a> NodeRef<'a> {
    /// The stored record behind this view.
    fn data(self) -> &'a NodeData {
        &self.tree.arena[self.id]
    }

    /// This node's handle, usable with the owning tree's builder calls.
    pub fn id(self) -> NodeId {
        NodeId(self.id)
    }

    /// The parent node, `None` for the root.
    pub fn parent(self) -> Option<Self> {
        self.data().parent.map(|idx| Self {
            tree: self.tree,
            id: idx,
        })
    }

    /// The children in left-to-right input order.
    pub fn children(self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.data().children.iter().map(move |&idx| Self {
            tree: self.tree,
            id: idx,
        })
    }

    /// Number of direct children.
    pub fn child_count(self) -> usize {
        self.data().children.len()
    }

    /// The node's modal verb.
    ///
    /// Defensively reports [`Verb::Unrecognized`] when the node itself is
    /// malformed (for example a leaf with no phrase), so that downstream
    /// consumers cannot mistake a broken node for a should-term.
    pub fn verb(self) -> Verb {
        let data = self.data();
        if data.is_locally_valid() {
            data.verb
        } else {
            Verb::Unrecognized
        }
    }

    /// The literal phrase; empty for internal nodes.
    pub fn phrase(self) -> &'a str {
        &self.data().phrase
    }

    /// Reports whether this node has no children.
    pub fn is_leaf(self) -> bool {
        self.data().children.is_empty()
    }

    /// Number of ancestors between this node and the root.
    pub fn depth(self) -> usize {
        let mut depth = 0;
        let mut node = self;
        while let Some(parent) = node.parent() {
            depth += 1;
            node = parent;
        }
        depth
    }

    /// Checks the node invariants over the subtree rooted here.
    pub fn is_valid(self) -> bool {
        let mut seen = HashSet::new();
        self.tree.subtree_valid(self.id, self.data().parent, &mut seen)
    }

    /// Structural equality of the subtrees rooted at `self` and `other`.
    /// Either side being locally malformed makes the comparison false.
    pub fn equals(self, other: NodeRef<'_>) -> bool {
        let (a, b) = (self.data(), other.data());
        a.is_locally_valid()
            && b.is_locally_valid()
            && a.verb == b.verb
            && a.phrase == b.phrase
            && a.children.len() == b.children.len()
            && self.children().zip(other.children()).all(|(x, y)| x.equals(y))
    }
}

impl fmt::Display for NodeRef<'_> {
    /// Canonical rendering: the verb's symbol, then the phrase for
    /// leaves, or the bracketed children for subqueries.
    ///
    /// A phrase containing whitespace or any reserved character is
    /// quoted, so the rendered string re-parses to an equal tree.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb().symbol())?;
        if self.is_leaf() {
            let phrase = self.phrase();
            if phrase.contains(|c: char| c.is_whitespace() || Role::is_reserved(c)) {
                write!(f, "\"{phrase}\"")
            } else {
                f.write_str(phrase)
            }
        } else {
            f.write_str("[")?;
            for (i, child) in self.children().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{child}")?;
            }
            f.write_str("]")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Root with two leaves: `[x y]`.
    fn two_leaf_tree() -> Tree {
        let mut tree = Tree::new();
        let root = tree.root_id();
        tree.add_leaf(root, Verb::Should, "x");
        tree.add_leaf(root, Verb::Should, "y");
        tree
    }

    #[test]
    fn fresh_tree_is_invalid() {
        assert!(!Tree::new().is_valid());
    }

    #[test]
    fn single_leaf_under_root_is_valid() {
        let mut tree = Tree::new();
        let root = tree.root_id();
        tree.add_leaf(root, Verb::Should, "test");
        assert!(tree.is_valid());
    }

    #[test]
    fn nested_chain_is_valid() {
        let mut tree = Tree::new();
        let root = tree.root_id();
        let mid = tree.add_child(root, Verb::Should);
        tree.add_leaf(mid, Verb::Should, "test");
        assert!(tree.is_valid());
    }

    #[test]
    fn internal_node_with_phrase_is_invalid() {
        let mut tree = Tree::new();
        let root = tree.root_id();
        let leaf = tree.add_leaf(root, Verb::Should, "test");
        // Giving the leaf a child makes it an internal node that still
        // carries a phrase, which violates the leaf ⇔ phrase invariant.
        tree.add_leaf(leaf, Verb::Should, "test");
        assert!(!tree.is_valid());
    }

    #[test]
    fn empty_internal_child_is_invalid() {
        let mut tree = Tree::new();
        let root = tree.root_id();
        tree.add_leaf(root, Verb::Should, "x");
        tree.add_child(root, Verb::Should);
        assert!(!tree.is_valid());
    }

    #[test]
    fn leaves_breadth_first() {
        let mut tree = Tree::new();
        let root = tree.root_id();
        tree.add_leaf(root, Verb::Should, "a");
        let sub = tree.add_child(root, Verb::Should);
        tree.add_leaf(sub, Verb::Should, "b");
        tree.add_leaf(sub, Verb::Should, "c");
        tree.add_leaf(root, Verb::Should, "d");

        let phrases: Vec<&str> = tree.leaves().iter().map(|n| n.phrase()).collect();
        // Shallow leaves come before deeper ones.
        assert_eq!(phrases, vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn leaf_root_yields_itself() {
        let mut tree = Tree::new();
        let root = tree.root_id();
        tree.add_leaf(root, Verb::Should, "only");
        tree.promote_root();

        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].phrase(), "only");
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn heights() {
        let mut h1 = Tree::new();
        let r1 = h1.root_id();
        h1.add_leaf(r1, Verb::Should, "x");
        assert_eq!(h1.height(), 1);

        let mut h2 = Tree::new();
        let r2 = h2.root_id();
        let mid = h2.add_child(r2, Verb::Should);
        h2.add_leaf(mid, Verb::Should, "x");
        h2.add_leaf(r2, Verb::Should, "y");
        assert_eq!(h2.height(), 2);
    }

    #[test]
    fn depths() {
        let mut tree = Tree::new();
        let root = tree.root_id();
        let sub = tree.add_child(root, Verb::Should);
        let leaf = tree.add_leaf(sub, Verb::Should, "x");

        assert_eq!(tree.root().depth(), 0);
        assert_eq!(tree.node(sub).unwrap().depth(), 1);
        assert_eq!(tree.node(leaf).unwrap().depth(), 2);
    }

    #[test]
    fn parent_links() {
        let mut tree = Tree::new();
        let root = tree.root_id();
        let sub = tree.add_child(root, Verb::Must);
        let leaf = tree.add_leaf(sub, Verb::Should, "x");

        assert!(tree.root().parent().is_none());
        let leaf_ref = tree.node(leaf).unwrap();
        assert_eq!(leaf_ref.parent().unwrap().id(), sub);
        assert_eq!(leaf_ref.parent().unwrap().parent().unwrap().id(), root);
    }

    #[test]
    fn canonical_two_leaves() {
        assert_eq!(two_leaf_tree().to_string(), "[x y]");
    }

    #[test]
    fn canonical_nested_with_verbs() {
        let mut tree = Tree::new();
        let root = tree.root_id();
        let c1 = tree.add_child(root, Verb::Should);
        tree.add_leaf(c1, Verb::Should, "x");
        tree.add_leaf(c1, Verb::Should, "y");
        let c2 = tree.add_child(root, Verb::Should);
        tree.add_leaf(c2, Verb::Must, "v");
        tree.add_leaf(c2, Verb::MustNot, "w");

        assert_eq!(tree.to_string(), "[[x y] [+v -w]]");
        assert_eq!(tree.canonical_string(), tree.to_string());
    }

    #[test]
    fn canonical_quotes_multiword_phrases() {
        let mut tree = Tree::new();
        let root = tree.root_id();
        tree.add_leaf(root, Verb::Should, "data science");
        tree.add_leaf(root, Verb::Must, "stats");

        assert_eq!(tree.to_string(), "[\"data science\" +stats]");
    }

    #[test]
    fn equals_same_shape() {
        assert!(two_leaf_tree().equals(&two_leaf_tree()));
    }

    #[test]
    fn equals_differing_verb() {
        let a = two_leaf_tree();
        let mut b = Tree::new();
        let root = b.root_id();
        b.add_leaf(root, Verb::Must, "x");
        b.add_leaf(root, Verb::Should, "y");
        assert!(!a.equals(&b));
    }

    #[test]
    fn equals_differing_phrase() {
        let a = two_leaf_tree();
        let mut b = Tree::new();
        let root = b.root_id();
        b.add_leaf(root, Verb::Should, "x");
        b.add_leaf(root, Verb::Should, "z");
        assert!(!a.equals(&b));
    }

    #[test]
    fn invalid_tree_never_equals() {
        let invalid = Tree::new();
        assert!(!invalid.equals(&invalid));
        assert!(!invalid.equals(&two_leaf_tree()));
        assert!(!two_leaf_tree().equals(&invalid));
    }

    #[test]
    fn defensive_verb_on_malformed_node() {
        let tree = Tree::new();
        // The bare root is a leaf with no phrase.
        assert_eq!(tree.root().verb(), Verb::Unrecognized);
    }

    #[test]
    fn hoist_only_child_reseats_parent() {
        let mut tree = Tree::new();
        let root = tree.root_id();
        let sub = tree.add_child(root, Verb::Must);
        let leaf = tree.add_leaf(sub, Verb::Should, "x");

        let hoisted = tree.hoist_only_child(sub).unwrap();
        assert_eq!(hoisted, leaf);
        assert_eq!(tree.parent_of(leaf), Some(root));
        assert_eq!(tree.child_count(root), 1);
        // The old node is gone from the arena.
        assert!(tree.node(sub).is_none());
    }

    #[test]
    fn hoist_refuses_root_and_multi_child() {
        let mut tree = two_leaf_tree();
        let root = tree.root_id();
        assert!(tree.hoist_only_child(root).is_none());
    }

    #[test]
    fn promote_root_single_child() {
        let mut tree = Tree::new();
        let root = tree.root_id();
        tree.add_leaf(root, Verb::Must, "x");
        tree.promote_root();

        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().phrase(), "x");
        assert_eq!(tree.root().verb(), Verb::Must);
        assert!(tree.root().parent().is_none());
        assert!(tree.is_valid());
    }

    #[test]
    fn promote_root_keeps_multi_child_root() {
        let mut tree = two_leaf_tree();
        tree.promote_root();
        assert_eq!(tree.root().child_count(), 2);
    }
}
