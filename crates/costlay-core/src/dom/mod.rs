//! Minimal document model the overlay reads from and writes to.
//!
//! The host page owns the tree and mutates it at will; the overlay only ever
//! touches its own render targets, the injected cost column, and marker
//! attributes.

mod document;
mod html;
mod node;
mod observer;

pub use document::Document;
pub use node::NodeId;
pub use observer::{MutationObserver, MutationRecord};

use thiserror::Error;

/// Error type for document operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The handle does not belong to this document
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// An element operation was applied to a text node
    #[error("{0} is not an element")]
    NotAnElement(NodeId),

    /// A sibling-relative insertion on a node without parent
    #[error("{node} has no parent")]
    Detached { node: NodeId },

    /// The insertion would make a node its own ancestor
    #[error("cannot insert {child} into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    /// The reference node is not a child of the given parent
    #[error("{reference} is not a child of {parent}")]
    NotAChild { parent: NodeId, reference: NodeId },
}
