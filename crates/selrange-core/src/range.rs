//! Selection ranges over a [`NodeTree`].

use crate::location::Location;
use crate::span::{SpanResult, leaf_span, node_span};
use crate::tree::{NodeId, NodeTree, TreeError};
use std::cell::OnceCell;
use std::fmt;
use thiserror::Error;

/// Range construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Invalid endpoint: {0}")]
    Endpoint(#[from] TreeError),
}

/// Result type for range construction.
pub type RangeResult<T> = Result<T, RangeError>;

/// A selection between two locations of a borrowed tree.
///
/// The leaf and node spans are computed on first access and cached for the
/// lifetime of the range. The tree stays borrowed, so it cannot change under
/// the cache. Ranges are cheap and meant to be rebuilt on every selection
/// change.
///
/// Equality compares `begin`, `end` and the direction only. The `trailing`
/// affinity is ignored.
pub struct SelectionRange<'t> {
    tree: &'t NodeTree,
    begin: Location,
    end: Location,
    forward: bool,
    trailing: bool,
    leaf_parts: OnceCell<SpanResult<Vec<NodeId>>>,
    selected_parts: OnceCell<SpanResult<Vec<NodeId>>>,
}

impl<'t> SelectionRange<'t> {
    /// Create a forward range from `begin` to `end` with trailing affinity.
    pub fn new(tree: &'t NodeTree, begin: Location, end: Location) -> RangeResult<Self> {
        Self::with_direction(tree, begin, end, true)
    }

    /// Create an empty forward range at `location`.
    pub fn collapsed(tree: &'t NodeTree, location: Location) -> RangeResult<Self> {
        Self::new(tree, location, location)
    }

    /// Create an empty forward range at `offset` inside `node`.
    pub fn at(tree: &'t NodeTree, node: NodeId, offset: usize) -> RangeResult<Self> {
        Self::collapsed(tree, Location::new(node, offset))
    }

    /// Create a forward range between two node offsets.
    pub fn between(
        tree: &'t NodeTree,
        begin: NodeId,
        begin_offset: usize,
        end: NodeId,
        end_offset: usize,
    ) -> RangeResult<Self> {
        Self::new(
            tree,
            Location::new(begin, begin_offset),
            Location::new(end, end_offset),
        )
    }

    /// Create a range with trailing affinity. A forward range puts the caret
    /// at `end`, a backward one at `begin`.
    pub fn with_direction(
        tree: &'t NodeTree,
        begin: Location,
        end: Location,
        forward: bool,
    ) -> RangeResult<Self> {
        Self::with_affinity(tree, begin, end, forward, true)
    }

    /// Create a range with explicit direction and affinity.
    ///
    /// # Errors
    ///
    /// Fails if either endpoint node does not belong to `tree`.
    pub fn with_affinity(
        tree: &'t NodeTree,
        begin: Location,
        end: Location,
        forward: bool,
        trailing: bool,
    ) -> RangeResult<Self> {
        tree.check(begin.node)?;
        tree.check(end.node)?;
        Ok(Self {
            tree,
            begin,
            end,
            forward,
            trailing,
            leaf_parts: OnceCell::new(),
            selected_parts: OnceCell::new(),
        })
    }

    pub fn tree(&self) -> &'t NodeTree {
        self.tree
    }

    pub fn begin(&self) -> Location {
        self.begin
    }

    pub fn end(&self) -> Location {
        self.end
    }

    pub fn is_forward(&self) -> bool {
        self.forward
    }

    /// Rendering affinity hint; not used by span computation.
    pub fn is_trailing(&self) -> bool {
        self.trailing
    }

    /// Where the caret is drawn.
    pub fn caret(&self) -> Location {
        if self.forward { self.end } else { self.begin }
    }

    /// The fixed end opposite the caret.
    pub fn anchor(&self) -> Location {
        if self.forward { self.begin } else { self.end }
    }

    /// True when both endpoints are the same location.
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Leaves between the endpoint nodes, inclusive, in document order.
    ///
    /// # Errors
    ///
    /// Returns the cached [`SpanError`](crate::span::SpanError) if the
    /// endpoints cannot be spanned.
    pub fn leaf_parts(&self) -> SpanResult<&[NodeId]> {
        self.leaf_parts
            .get_or_init(|| leaf_span(self.tree, self.begin.node, self.end.node))
            .as_deref()
            .map_err(Clone::clone)
    }

    /// Minimal covering nodes between the endpoint nodes, in document order.
    ///
    /// # Errors
    ///
    /// Same as [`Self::leaf_parts`].
    pub fn selected_parts(&self) -> SpanResult<&[NodeId]> {
        self.selected_parts
            .get_or_init(|| node_span(self.tree, self.begin.node, self.end.node))
            .as_deref()
            .map_err(Clone::clone)
    }
}

impl PartialEq for SelectionRange<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree)
            && self.begin == other.begin
            && self.end == other.end
            && self.forward == other.forward
    }
}

impl Eq for SelectionRange<'_> {}

impl fmt::Debug for SelectionRange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionRange")
            .field("begin", &self.begin)
            .field("end", &self.end)
            .field("forward", &self.forward)
            .field("trailing", &self.trailing)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::SpanError;

    /// Root[P[P1, P2], Q[Q1]]
    fn doc() -> (NodeTree, [NodeId; 6]) {
        let mut tree = NodeTree::new();
        let root = tree.add_root(None);
        let p = tree.add_child(root, None).unwrap();
        let p1 = tree.add_child(p, None).unwrap();
        let p2 = tree.add_child(p, None).unwrap();
        let q = tree.add_child(root, None).unwrap();
        let q1 = tree.add_child(q, None).unwrap();
        (tree, [root, p, p1, p2, q, q1])
    }

    #[test]
    fn test_defaults() {
        let (tree, [.., p1, _, _, q1]) = doc();
        let range = SelectionRange::between(&tree, p1, 2, q1, 0).unwrap();
        assert!(range.is_forward());
        assert!(range.is_trailing());
        assert_eq!(range.caret(), Location::new(q1, 0));
        assert_eq!(range.anchor(), Location::new(p1, 2));
        assert!(!range.is_empty());
    }

    #[test]
    fn test_backward_caret() {
        let (tree, [.., p1, _, _, q1]) = doc();
        let range = SelectionRange::with_direction(
            &tree,
            Location::new(p1, 2),
            Location::new(q1, 4),
            false,
        )
        .unwrap();
        assert_eq!(range.caret(), Location::new(p1, 2));
        assert_eq!(range.anchor(), Location::new(q1, 4));
    }

    #[test]
    fn test_collapsed_is_empty() {
        let (tree, [.., p2, _, _]) = doc();
        let range = SelectionRange::at(&tree, p2, 3).unwrap();
        assert!(range.is_empty());
        assert_eq!(range.leaf_parts().unwrap(), &[p2]);
        assert_eq!(range.selected_parts().unwrap(), &[p2]);

        let same_node = SelectionRange::between(&tree, p2, 1, p2, 3).unwrap();
        assert!(!same_node.is_empty());
    }

    #[test]
    fn test_parts_are_cached() {
        let (tree, [_, _, p1, p2, q, q1]) = doc();
        let range = SelectionRange::between(&tree, p2, 0, q1, 1).unwrap();
        let first = range.leaf_parts().unwrap();
        assert_eq!(first, &[p2, q1]);
        assert!(std::ptr::eq(first, range.leaf_parts().unwrap()));
        assert_eq!(range.selected_parts().unwrap(), &[p2, q1]);

        let wide = SelectionRange::between(&tree, p1, 0, q, 0).unwrap();
        assert_eq!(wide.selected_parts().unwrap(), &[p1, p2, q]);
        assert_eq!(wide.leaf_parts().unwrap(), &[p1, p2, q1]);
    }

    #[test]
    fn test_equality_ignores_trailing() {
        let (tree, [.., p1, _, _, q1]) = doc();
        let (b, e) = (Location::new(p1, 0), Location::new(q1, 1));
        let a = SelectionRange::with_affinity(&tree, b, e, true, true).unwrap();
        let c = SelectionRange::with_affinity(&tree, b, e, true, false).unwrap();
        let d = SelectionRange::with_affinity(&tree, b, e, false, true).unwrap();
        assert_eq!(a, c);
        assert_ne!(a, d);

        let other_tree = tree.clone();
        let f = SelectionRange::with_affinity(&other_tree, b, e, true, true).unwrap();
        assert_ne!(a, f);
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        let (tree, [root, ..]) = doc();
        let mut bigger = tree.clone();
        for _ in 0..4 {
            bigger.add_root(None);
        }
        let foreign = bigger.add_root(None);
        let err = SelectionRange::between(&tree, root, 0, foreign, 0).unwrap_err();
        assert_eq!(err, RangeError::Endpoint(TreeError::UnknownNode(foreign)));
    }

    #[test]
    fn test_span_error_is_cached() {
        let mut tree = NodeTree::new();
        let a = tree.add_root(None);
        let b = tree.add_root(None);
        let range = SelectionRange::between(&tree, a, 0, b, 0).unwrap();
        let expected = SpanError::NoCommonAncestor { left: a, right: b };
        assert_eq!(range.leaf_parts(), Err(expected.clone()));
        assert_eq!(range.selected_parts(), Err(expected));
    }
}
