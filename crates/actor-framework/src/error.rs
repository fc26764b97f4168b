//! # Framework Errors
//!
//! Errors raised by the runtime itself, as opposed to the domain errors an
//! entity returns from its hooks. Domain errors travel inside
//! [`FrameworkError::EntityError`] and can be recovered with
//! [`FrameworkError::downcast_entity`].

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    /// Recovers the concrete entity error carried by `EntityError`.
    ///
    /// Returns the original `FrameworkError` unchanged when it is not an
    /// entity error or when the boxed error is of a different type.
    pub fn downcast_entity<E>(self) -> Result<E, FrameworkError>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        match self {
            FrameworkError::EntityError(inner) => match inner.downcast::<E>() {
                Ok(e) => Ok(*e),
                Err(other) => Err(FrameworkError::EntityError(other)),
            },
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error, PartialEq)]
    #[error("rejected: {0}")]
    struct Rejected(String);

    #[test]
    fn downcast_recovers_entity_error() {
        let err = FrameworkError::EntityError(Box::new(Rejected("wrong role".into())));
        assert_eq!(err.downcast_entity::<Rejected>().unwrap(), Rejected("wrong role".into()));
    }

    #[test]
    fn downcast_leaves_other_errors_untouched() {
        let err = FrameworkError::NotFound("order_9".into());
        assert!(matches!(
            err.downcast_entity::<Rejected>(),
            Err(FrameworkError::NotFound(id)) if id == "order_9"
        ));

        let err = FrameworkError::EntityError(Box::new(std::io::Error::other("disk")));
        assert!(matches!(
            err.downcast_entity::<Rejected>(),
            Err(FrameworkError::EntityError(_))
        ));
    }
}
