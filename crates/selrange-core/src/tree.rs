//! Ordered node tree stored as an arena.
//!
//! Nodes are addressed by [`NodeId`] indices. Each record keeps its ordered
//! child list and a parent back-reference, so traversal never needs shared
//! ownership. A single arena may hold several roots; nodes under different
//! roots have no common ancestor.
//!
//! Trees serialize as their arena. Deserialization checks that parent and
//! child links agree and that no node is its own ancestor.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Stable identifier of a node inside a [`NodeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index of this node.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tree errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),
    #[error("Malformed tree: {0}")]
    Malformed(String),
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct NodeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

/// Arena of nodes with ordered children and parent back-references.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawTree")]
pub struct NodeTree {
    nodes: Vec<NodeRecord>,
}

/// Unchecked arena as read from a document.
#[derive(Deserialize)]
struct RawTree {
    nodes: Vec<NodeRecord>,
}

impl TryFrom<RawTree> for NodeTree {
    type Error = TreeError;

    fn try_from(raw: RawTree) -> TreeResult<Self> {
        let tree = NodeTree { nodes: raw.nodes };
        let len = tree.nodes.len();
        let malformed = |msg: String| -> TreeResult<Self> { Err(TreeError::Malformed(msg)) };

        for (index, record) in tree.nodes.iter().enumerate() {
            let id = NodeId(index);
            for &child in &record.children {
                if child.0 >= len {
                    return malformed(format!("{id} lists unknown child {child}"));
                }
                if tree.nodes[child.0].parent != Some(id) {
                    return malformed(format!("{child} is listed under {id} but not linked back"));
                }
            }
            if let Some(parent) = record.parent {
                if parent.0 >= len {
                    return malformed(format!("{id} has unknown parent {parent}"));
                }
                let listed = tree.nodes[parent.0].children.iter().filter(|&&c| c == id).count();
                if listed != 1 {
                    return malformed(format!("{id} appears {listed} times under {parent}"));
                }
            }
            if tree.ancestors(id).take(len + 1).count() > len {
                return malformed(format!("{id} is its own ancestor"));
            }
        }
        log::debug!("loaded tree with {len} nodes");
        Ok(tree)
    }
}

impl NodeTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the arena, across all roots.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check whether `id` belongs to this tree.
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Fail with [`TreeError::UnknownNode`] unless `id` belongs to this tree.
    pub fn check(&self, id: NodeId) -> TreeResult<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(TreeError::UnknownNode(id))
        }
    }

    fn record(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(id.0)
    }

    fn push(&mut self, parent: Option<NodeId>, label: Option<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeRecord {
            parent,
            children: Vec::new(),
            label,
        });
        id
    }

    /// Add a new parentless node.
    pub fn add_root(&mut self, label: Option<&str>) -> NodeId {
        self.push(None, label.map(str::to_string))
    }

    /// Append a new node as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, label: Option<&str>) -> TreeResult<NodeId> {
        self.check(parent)?;
        Ok(self.push_child(parent, label.map(str::to_string)))
    }

    /// Append a child under `parent`, which must already be in the arena.
    pub(crate) fn push_child(&mut self, parent: NodeId, label: Option<String>) -> NodeId {
        let id = self.push(Some(parent), label);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Parent of `id`, or `None` for roots and unknown nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.record(id).and_then(|r| r.parent)
    }

    /// Ordered children of `id`. Unknown nodes have none.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.record(id)
            .map(|r| r.children.as_slice())
            .unwrap_or_default()
    }

    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.record(id).and_then(|r| r.label.as_deref())
    }

    /// First node (in arena order) carrying `label`.
    pub fn find_by_label(&self, label: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|r| r.label.as_deref() == Some(label))
            .map(NodeId)
    }

    /// A leaf is a node without children.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.children(id).is_empty()
    }

    /// Position of `id` in its parent's child list.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Iterate over the strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Number of edges between `id` and its root.
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Root of the subtree containing `id`.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Check whether `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Lowest common ancestor of `a` and `b`.
    ///
    /// A node counts as its own ancestor here, so if one node contains the
    /// other the containing node is returned. `None` when the nodes sit under
    /// different roots or either is unknown.
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        if !self.contains(a) || !self.contains(b) {
            return None;
        }
        let (mut a, mut b) = (a, b);
        let (mut depth_a, mut depth_b) = (self.depth(a), self.depth(b));
        while depth_a > depth_b {
            a = self.parent(a)?;
            depth_a -= 1;
        }
        while depth_b > depth_a {
            b = self.parent(b)?;
            depth_b -= 1;
        }
        while a != b {
            a = self.parent(a)?;
            b = self.parent(b)?;
        }
        Some(a)
    }

    /// Depth-first leaf expansion of `id`. A leaf expands to itself.
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_leaves(id, &mut out);
        out
    }

    /// Append the leaves under `id` to `out` in document order.
    pub(crate) fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let children = self.children(node);
            if children.is_empty() {
                out.push(node);
            } else {
                stack.extend(children.iter().rev());
            }
        }
    }

    /// Last leaf, in document order, under `id`.
    pub fn last_leaf(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(&last) = self.children(current).last() {
            current = last;
        }
        current
    }

    /// Every node under `id` (inclusive) in pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev());
        }
        out
    }

    /// Compare two nodes in document (pre-)order.
    ///
    /// An ancestor precedes its descendants. `None` when the nodes share no
    /// common ancestor.
    pub fn document_order(&self, a: NodeId, b: NodeId) -> Option<Ordering> {
        let lca = self.common_ancestor(a, b)?;
        if a == b {
            return Some(Ordering::Equal);
        }
        if lca == a {
            return Some(Ordering::Less);
        }
        if lca == b {
            return Some(Ordering::Greater);
        }
        let ia = self.index_in_parent(self.child_toward(lca, a)?)?;
        let ib = self.index_in_parent(self.child_toward(lca, b)?)?;
        Some(ia.cmp(&ib))
    }

    /// The child of `ancestor` on the path down to `node`.
    pub(crate) fn child_toward(&self, ancestor: NodeId, node: NodeId) -> Option<NodeId> {
        let mut current = node;
        loop {
            let parent = self.parent(current)?;
            if parent == ancestor {
                return Some(current);
            }
            current = parent;
        }
    }

    /// Drop every entry whose ancestor is also present in `nodes`.
    ///
    /// Order of the survivors is preserved.
    pub fn without_dependants(&self, nodes: &[NodeId]) -> Vec<NodeId> {
        let set: HashSet<NodeId> = nodes.iter().copied().collect();
        nodes
            .iter()
            .copied()
            .filter(|&n| !self.ancestors(n).any(|a| set.contains(&a)))
            .collect()
    }
}

/// Iterator returned by [`NodeTree::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    tree: &'a NodeTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
