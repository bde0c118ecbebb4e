//! Lumen DOM - Document Object Model
//!
//! Arena-backed node tree with attribute/style stores, batched mutation
//! records and capture/target/bubble event dispatch.

mod attributes;
mod document;
mod error;
mod events;
mod mutation;
mod node;
mod style;
mod tree;

pub use attributes::{Attr, AttributeMap};
pub use document::Document;
pub use error::{DomError, DomResult};
pub use events::{
    Event, EventCallback, EventPhase, HandlerId, ListenerOptions, ListenerRegistry,
    RegisteredListener,
};
pub use mutation::{MutationCallback, MutationQueue, MutationRecord, ObserverId};
pub use node::{ElementData, Node, NodeData, NodeType, TextData};
pub use style::{StyleDeclaration, normalize_property_name};
pub use tree::{Ancestors, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Document root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Arena slot of this node
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
