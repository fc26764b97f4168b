//! # Staff Actor
//!
//! The shop's roster. Order operations take an [`Actor`](crate::model::Actor)
//! from the caller; this actor is where the demo and the tests get one, via
//! [`StaffClient::identify`].
//!
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation
//!   for [`StaffMember`]
//! - [`error`] - [`StaffError`]

pub mod entity;
pub mod error;

pub use entity::*;
pub use error::*;

use crate::clients::StaffClient;
use crate::model::StaffMember;
use actor_framework::ResourceActor;

/// Creates a new Staff actor and its client.
pub fn new(capacity: usize) -> (ResourceActor<StaffMember>, StaffClient) {
    let (actor, generic_client) = ResourceActor::new(capacity);
    (actor, StaffClient::new(generic_client))
}
