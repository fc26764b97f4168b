//! # Generic Messages
//!
//! Requests sent from a [`ResourceClient`](crate::ResourceClient) to its
//! [`ResourceActor`](crate::ResourceActor).

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type sent to the actor to request operations.
///
/// There is deliberately no generic `Update`: once created, an entity only
/// changes through its own [`ActorEntity::Action`] commands, which the actor
/// applies to a staged copy and commits only when the handler succeeds.
///
/// - **Create**: assigns an id and builds the entity from [`ActorEntity::Create`].
/// - **Get**: snapshot of one entity.
/// - **List**: snapshot of every entity, in id order.
/// - **Delete**: unconditional removal (after the `on_delete` hook).
/// - **Action**: a domain command.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}
