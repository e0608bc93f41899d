use thiserror::Error;

use crate::miter::MiterError;

use super::NodeId;

/// The result of an AIG operation.
pub type Result<T> = std::result::Result<T, AigError>;

/// Error returned when an AIG operation failed.
///
/// Requests that are rejected leave the graph untouched.
#[derive(Debug, Error)]
pub enum AigError {
    /// The node with given id does not exist.
    #[error("node with id={0} does not exist")]
    NodeDoesNotExist(NodeId),

    /// The node was freed (merged away while reference counting was enabled).
    #[error("node with id={0} has been freed")]
    NodeIsDead(NodeId),

    /// The operation expects a latch.
    #[error("node with id={0} is not a latch")]
    NotALatch(NodeId),

    /// Inserting the node in the choice class of `repr` would create a cycle,
    /// since `repr` is reachable from `node`.
    #[error("cannot add node {node} as a choice of {repr}: the representative lies in its fanin")]
    CyclicChoice { repr: NodeId, node: NodeId },

    /// The choice request is malformed (representative already merged, node already in a class, ...).
    #[error("invalid choice request: {0}")]
    InvalidChoice(String),

    /// There is no output with this index.
    #[error("there is no output with index {0}")]
    NoSuchOutput(usize),

    /// A pattern does not match the number of inputs or latches.
    #[error("expected {expected} values, got {got}")]
    PatternLength { expected: usize, got: usize },

    /// Growing the node arena or a simulation buffer failed.
    #[error("out of memory while growing the AIG")]
    OutOfMemory,

    /// The AIG has reached an invalid state. This should never happen.
    /// It is mostly raised by [`Aig::check_integrity`].
    ///
    /// [`Aig::check_integrity`]: super::Aig::check_integrity
    #[error("the AIG has reached an invalid state - this should not happen - error: {0}")]
    InvalidState(String),

    /// Just forwarding a [`MiterError`].
    #[error("{0}")]
    MiterError(#[from] MiterError),
}
