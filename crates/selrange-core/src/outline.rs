//! Declarative tree documents.
//!
//! An outline is a labelled nested list that serializes to JSON:
//!
//! ```json
//! { "label": "Root", "children": [
//!     { "label": "A", "children": [{ "label": "A1" }, { "label": "A2" }] },
//!     { "label": "B" }
//! ] }
//! ```

use crate::tree::{NodeId, NodeTree, TreeError, TreeResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Outline errors.
#[derive(Debug, Error)]
pub enum OutlineError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),
}

/// Result type for outline operations.
pub type OutlineResult<T> = Result<T, OutlineError>;

/// A labelled node and its ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Outline>,
}

impl Outline {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn node(label: impl Into<String>, children: Vec<Outline>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    /// Parse an outline from JSON.
    pub fn from_json(json: &str) -> OutlineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> OutlineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl NodeTree {
    /// Build a tree holding a single outline.
    pub fn from_outline(outline: &Outline) -> (Self, NodeId) {
        let mut tree = Self::new();
        let root = tree.append_outline(outline);
        (tree, root)
    }

    /// Append `outline` to this arena as a new root.
    pub fn append_outline(&mut self, outline: &Outline) -> NodeId {
        let root = self.add_root(Some(&outline.label));
        let mut pending: Vec<(NodeId, &Outline)> = vec![(root, outline)];
        while let Some((parent, node)) = pending.pop() {
            for child in &node.children {
                let id = self.push_child(parent, Some(child.label.clone()));
                pending.push((id, child));
            }
        }
        log::debug!(
            "appended outline '{}': {} nodes in arena",
            outline.label,
            self.len()
        );
        root
    }

    /// Rebuild the outline rooted at `node`. Unlabelled nodes get an empty
    /// label.
    pub fn to_outline(&self, node: NodeId) -> TreeResult<Outline> {
        self.check(node)?;
        let mut built: HashMap<NodeId, Outline> = HashMap::new();
        // Reverse pre-order visits every child before its parent.
        for id in self.descendants(node).into_iter().rev() {
            let children = self
                .children(id)
                .iter()
                .filter_map(|c| built.remove(c))
                .collect();
            let label = self.label(id).unwrap_or_default().to_string();
            built.insert(id, Outline { label, children });
        }
        built.remove(&node).ok_or(TreeError::UnknownNode(node))
    }
}
