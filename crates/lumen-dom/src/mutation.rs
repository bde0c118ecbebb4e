//! Mutation Records
//!
//! Change records queued by document mutations and delivered in one batch to
//! every active observer when the host flushes.

use std::fmt;
use std::rc::Rc;

use crate::{Document, NodeId};

/// Observer callback. Receives every record queued since the last flush.
pub type MutationCallback = Rc<dyn Fn(&mut Document, &[MutationRecord])>;

/// Observer registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

/// Mutation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord {
    /// Children added to or removed from `target`
    ChildList {
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
        previous_sibling: Option<NodeId>,
        next_sibling: Option<NodeId>,
    },
    /// Attribute (or inline style) change on an element
    Attributes {
        target: NodeId,
        name: String,
        old_value: Option<String>,
    },
    /// Text node data change
    CharacterData {
        target: NodeId,
        old_value: String,
    },
}

impl MutationRecord {
    pub fn target(&self) -> NodeId {
        match self {
            Self::ChildList { target, .. }
            | Self::Attributes { target, .. }
            | Self::CharacterData { target, .. } => *target,
        }
    }

    pub fn is_child_list(&self) -> bool {
        matches!(self, Self::ChildList { .. })
    }

    pub fn is_attributes(&self) -> bool {
        matches!(self, Self::Attributes { .. })
    }

    /// Attribute name for attribute records
    pub fn attribute_name(&self) -> Option<&str> {
        match self {
            Self::Attributes { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Pending records plus the registered observers
#[derive(Default)]
pub struct MutationQueue {
    records: Vec<MutationRecord>,
    observers: Vec<(ObserverId, MutationCallback)>,
    next_id: u64,
}

impl fmt::Debug for MutationQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationQueue")
            .field("records", &self.records)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl MutationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: MutationRecord) {
        self.records.push(record);
    }

    /// Drain all pending records
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn pending(&self) -> &[MutationRecord] {
        &self.records
    }

    pub fn observe(&mut self, callback: MutationCallback) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.observers.push((id, callback));
        id
    }

    /// Stop delivering to an observer. Returns whether it was registered.
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    pub fn is_active(&self, id: ObserverId) -> bool {
        self.observers.iter().any(|(oid, _)| *oid == id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Snapshot of registered observers in registration order
    pub(crate) fn observers(&self) -> Vec<(ObserverId, MutationCallback)> {
        self.observers.clone()
    }
}
