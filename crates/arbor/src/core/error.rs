use std::result::Result as StdResult;

use thiserror::Error;

use crate::core::id::NodeId;

/// Result type for arbor operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
///
/// Deliberately small: per the dispatch and focus contracts, most "it
/// didn't happen" cases (ineligible focus target, detached event
/// target, unmatched restore key) are reported through return values,
/// not errors.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    /// The node is not present in the arena.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),
    /// A structural operation would create a parent/child cycle.
    #[error("cycle: {0:?} cannot become its own ancestor")]
    WouldCycle(NodeId),
    /// A structural operation targeted a node that already has a parent.
    #[error("node already attached to a parent: {0:?}")]
    AlreadyParented(NodeId),
    /// The root node cannot be the target of this operation.
    #[error("operation not permitted on the root node")]
    RootNode,
    /// Layout failure.
    #[error("layout: {0}")]
    Layout(String),
    /// Internal error.
    #[error("internal: {0}")]
    Internal(String),
}
