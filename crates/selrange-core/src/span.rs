//! Leaf and node spans between two anchors of a [`NodeTree`].
//!
//! Both walks start at the lowest common ancestor (LCA) of the anchors:
//!
//! - the left anchor climbs to the LCA, picking up everything to the right
//!   of its path at each level;
//! - the right anchor climbs symmetrically, picking up everything to the
//!   left of its path;
//! - the LCA children strictly between the two paths form the middle.
//!
//! [`leaf_span`] expands every collected node to its leaves, [`node_span`]
//! keeps collected nodes whole.

use crate::tree::{NodeId, NodeTree};
use thiserror::Error;

/// Span query errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpanError {
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),
    #[error("No common ancestor between {left} and {right}")]
    NoCommonAncestor { left: NodeId, right: NodeId },
    #[error("Anchor {ancestor} contains anchor {descendant}")]
    NestedAnchors { ancestor: NodeId, descendant: NodeId },
    #[error("Anchor {right} precedes anchor {left} in document order")]
    OutOfOrder { left: NodeId, right: NodeId },
}

/// Result type for span queries.
pub type SpanResult<T> = Result<T, SpanError>;

/// Where the two anchors meet.
enum Meeting {
    /// `left` is a strict ancestor of `right`.
    Contains,
    /// The anchors sit under different children of `lca`.
    Split {
        lca: NodeId,
        /// Index under `lca` of the child leading to the left anchor.
        left_index: usize,
        /// Index under `lca` of the child leading to the right anchor.
        right_index: usize,
    },
}

fn meeting(tree: &NodeTree, left: NodeId, right: NodeId) -> SpanResult<Meeting> {
    for id in [left, right] {
        if !tree.contains(id) {
            return Err(SpanError::UnknownNode(id));
        }
    }
    let lca = tree
        .common_ancestor(left, right)
        .ok_or(SpanError::NoCommonAncestor { left, right })?;
    if lca == right {
        return Err(SpanError::OutOfOrder { left, right });
    }
    if lca == left {
        log::trace!("span {left}..{right}: {left} contains {right}");
        return Ok(Meeting::Contains);
    }
    let index_under_lca = |node| {
        tree.child_toward(lca, node)
            .and_then(|child| tree.index_in_parent(child))
            .ok_or(SpanError::NoCommonAncestor { left, right })
    };
    let left_index = index_under_lca(left)?;
    let right_index = index_under_lca(right)?;
    if left_index > right_index {
        return Err(SpanError::OutOfOrder { left, right });
    }
    log::trace!("span {left}..{right}: lca {lca}, children {left_index}..{right_index}");
    Ok(Meeting::Split {
        lca,
        left_index,
        right_index,
    })
}

/// Siblings after `node` at each level from `node` up to (excluding) `stop`.
fn right_of_path(tree: &NodeTree, node: NodeId, stop: NodeId, mut visit: impl FnMut(NodeId)) {
    let mut current = node;
    while let Some(parent) = tree.parent(current).filter(|&p| p != stop) {
        let siblings = tree.children(parent);
        if let Some(index) = tree.index_in_parent(current) {
            siblings[index + 1..].iter().for_each(|&s| visit(s));
        }
        current = parent;
    }
}

/// Siblings before `node` at each level from `node` up to (excluding) `stop`.
///
/// Levels are returned nearest first; each level is in document order.
fn left_of_path(tree: &NodeTree, node: NodeId, stop: NodeId) -> Vec<&[NodeId]> {
    let mut levels = Vec::new();
    let mut current = node;
    while let Some(parent) = tree.parent(current).filter(|&p| p != stop) {
        if let Some(index) = tree.index_in_parent(current) {
            levels.push(&tree.children(parent)[..index]);
        }
        current = parent;
    }
    levels
}

fn logged<T>(result: SpanResult<T>) -> SpanResult<T> {
    if let Err(e) = &result {
        log::debug!("span query failed: {e}");
    }
    result
}

/// Every leaf between `left` and `right`, inclusive, in document order.
///
/// Anchors that are internal nodes are expanded to their own leaves, so the
/// result runs from the first leaf of `left` to the last leaf of `right`.
/// When `left == right` the result is the leaf expansion of that node. When
/// `left` contains `right` the result is the leaves of `left` up to and
/// including the last leaf of `right`.
///
/// # Errors
///
/// Fails when either anchor is unknown, when the anchors share no ancestor,
/// or when `right` precedes `left` (including `right` containing `left`).
pub fn leaf_span(tree: &NodeTree, left: NodeId, right: NodeId) -> SpanResult<Vec<NodeId>> {
    if left == right {
        return logged(tree.check(left).map_err(|_| SpanError::UnknownNode(left)))
            .map(|()| tree.leaves(left));
    }
    let (lca, left_index, right_index) = match logged(meeting(tree, left, right))? {
        Meeting::Contains => {
            let mut result = tree.leaves(left);
            let last = tree.last_leaf(right);
            if let Some(end) = result.iter().position(|&n| n == last) {
                result.truncate(end + 1);
            }
            log::trace!("leaf span {left}..{right}: {} leaves", result.len());
            return Ok(result);
        }
        Meeting::Split {
            lca,
            left_index,
            right_index,
        } => (lca, left_index, right_index),
    };

    let mut result = tree.leaves(left);
    right_of_path(tree, left, lca, |n| tree.collect_leaves(n, &mut result));

    for &middle in &tree.children(lca)[left_index + 1..right_index] {
        tree.collect_leaves(middle, &mut result);
    }

    for level in left_of_path(tree, right, lca).into_iter().rev() {
        for &n in level {
            tree.collect_leaves(n, &mut result);
        }
    }
    tree.collect_leaves(right, &mut result);

    log::trace!("leaf span {left}..{right}: {} leaves", result.len());
    Ok(result)
}

/// Minimal covering nodes between `left` and `right`, inclusive, in document
/// order.
///
/// Each returned node stands for its whole subtree. Descent stops at the
/// shallowest fully spanned node, except that `left` and `right` always
/// appear themselves. Expanding the result to leaves yields exactly
/// [`leaf_span`] for the same anchors.
///
/// # Errors
///
/// Same conditions as [`leaf_span`]. In addition, `left` containing `right`
/// fails with [`SpanError::NestedAnchors`]: no sequence can keep both anchors
/// literal and still cover each leaf exactly once.
pub fn node_span(tree: &NodeTree, left: NodeId, right: NodeId) -> SpanResult<Vec<NodeId>> {
    if left == right {
        return logged(tree.check(left).map_err(|_| SpanError::UnknownNode(left)))
            .map(|()| vec![left]);
    }
    let (lca, left_index, right_index) = match logged(meeting(tree, left, right))? {
        Meeting::Contains => {
            return logged(Err(SpanError::NestedAnchors {
                ancestor: left,
                descendant: right,
            }));
        }
        Meeting::Split {
            lca,
            left_index,
            right_index,
        } => (lca, left_index, right_index),
    };

    let mut result = vec![left];
    right_of_path(tree, left, lca, |n| result.push(n));

    result.extend_from_slice(&tree.children(lca)[left_index + 1..right_index]);

    for level in left_of_path(tree, right, lca).into_iter().rev() {
        result.extend_from_slice(level);
    }
    result.push(right);

    log::trace!("node span {left}..{right}: {} nodes", result.len());
    Ok(result)
}
