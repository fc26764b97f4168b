//! Error types for the Staff actor.

use thiserror::Error;

/// Errors that can occur during roster operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StaffError {
    /// No staff member has the requested id.
    #[error("Staff member not found: {0}")]
    NotFound(String),

    /// The staff data provided is invalid.
    #[error("Invalid staff member: {0}")]
    InvalidInput(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
