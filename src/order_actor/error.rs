//! Error types for the Order actor.

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// A guard rejected the request: wrong role, wrong status, wrong assignment
    /// or an incomplete checklist. Retrying the same request will fail again.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Another fulfillment actor holds the work lock.
    #[error("Order is being worked on by {holder}")]
    Locked { holder: String },

    /// The request data is malformed and must be corrected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The order or a referenced product does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    pub(crate) fn forbidden(msg: impl Into<String>) -> Self {
        OrderError::Forbidden(msg.into())
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        OrderError::InvalidInput(msg.into())
    }

    /// Whether the same request may succeed later without being changed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OrderError::Locked { .. } | OrderError::ActorCommunicationError(_)
        )
    }
}
