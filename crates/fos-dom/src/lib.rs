//! fOS DOM - Document Object Model
//!
//! Arena-backed element tree used by the fOS media renderer.
//!
//! Features:
//! - Element nodes with ordered attributes
//! - appendChild / removeChild with hierarchy checks
//! - Simple selector queries (`tag`, `#id`, `.class`)
//! - Event listener registry and a FIFO event queue

mod node;
mod tree;
mod document;
mod attributes;
mod operations;
mod dom_events;
mod element;

pub use node::{Node, NodeData, ElementData};
pub use tree::DomTree;
pub use document::Document;
pub use attributes::{Attr, Attributes};
pub use operations::{DomError, DomResult};
pub use dom_events::{Event, EventType, EventListeners, ListenerId};
pub use element::SimpleSelector;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
