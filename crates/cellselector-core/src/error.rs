//! Error types for cellselector-core.

use thiserror::Error;

/// Errors raised by the grid engine.
///
/// Every variant indicates a contract violation by the engine or its host,
/// never a transient condition, so none of them is worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Bad construction input or coordinate.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation invoked while grid or mode invariants do not hold.
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// An expected singleton cell is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Action or intent kind the receiver does not handle.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
}

impl GridError {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn illegal_state(msg: impl Into<String>) -> Self {
        Self::IllegalState(msg.into())
    }
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, GridError>;
