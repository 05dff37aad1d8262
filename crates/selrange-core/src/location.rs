//! Selection endpoints.

use crate::tree::NodeId;
use serde::{Deserialize, Serialize};

/// A position inside a node's content.
///
/// `offset` is opaque to span traversal; hosts typically store a character
/// index into the node's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub node: NodeId,
    pub offset: usize,
}

impl Location {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}
