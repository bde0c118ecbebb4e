//! DOM operation errors

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// Reasons a tree operation was refused.
///
/// A refused operation never leaves the tree partially modified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Handle does not refer to a node of this document
    #[error("node {0} not found")]
    NotFound(NodeId),
    /// Insertion would create a cycle or put a node under a leaf
    #[error("hierarchy request error: cannot insert {child} into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    /// Node is not a child of the given parent
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
    /// Operation requires a different node kind
    #[error("invalid node type for {0}")]
    InvalidNodeType(NodeId),
}
