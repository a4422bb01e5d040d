//! Error types for document operations.

use thiserror::Error;

/// Result type for document operations.
pub type CoreResult<T> = Result<T, DocumentError>;

/// Errors that can occur while constructing or serializing documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Node id failed validation.
    #[error("Invalid node id: {0}")]
    InvalidNodeId(String),

    /// Referenced node does not exist in the document.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A single structural invariant violation reported by [`crate::Document::validate`].
///
/// Violations are diagnostics, not failures: a document that reports
/// violations still renders (the renderer degrades per node), but an editing
/// session should refuse to commit mutations that would introduce one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentViolation {
    /// The root reference points at a node that is not in the map.
    #[error("root node {0} is missing from the node map")]
    MissingRoot(String),

    /// A child id has no corresponding node.
    #[error("child {child} of {parent} is not in the node map")]
    DanglingChild {
        /// Id of the node listing the child.
        parent: String,
        /// The dangling child id.
        child: String,
    },

    /// A node is reachable through more than one parent.
    #[error("node {0} is reachable through more than one parent")]
    SharedNode(String),

    /// A non-canvas node lists children.
    #[error("non-canvas node {0} has children")]
    LeafWithChildren(String),

    /// A child's parent back-reference does not match the node listing it.
    #[error("parent back-reference of {child} does not match {parent}")]
    ParentMismatch {
        /// Id of the node listing the child.
        parent: String,
        /// Id of the child with the stale back-reference.
        child: String,
    },

    /// A node in the map is not reachable from the root.
    #[error("node {0} is not reachable from the root")]
    Unreachable(String),
}
