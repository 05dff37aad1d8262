//! Selection range core library.
//!
//! Computes the leaves and the minimal covering nodes spanned by a selection
//! between two locations of an ordered node tree.

pub mod location;
pub mod outline;
pub mod range;
pub mod span;
pub mod tree;

pub use location::Location;
pub use outline::{Outline, OutlineError, OutlineResult};
pub use range::{RangeError, RangeResult, SelectionRange};
pub use span::{SpanError, SpanResult, leaf_span, node_span};
pub use tree::{Ancestors, NodeId, NodeTree, TreeError, TreeResult};
