//! # ActorEntity Trait
//!
//! The contract a resource type implements to be hosted by a
//! [`ResourceActor`](crate::ResourceActor): associated types for ids, the
//! creation payload, domain commands, injected context and errors, plus the
//! lifecycle hooks the actor calls.
//!
//! `on_create` and `on_delete` are provided methods that do nothing by default.

use async_trait::async_trait;
use std::fmt::{Debug, Display};

/// Trait that any resource entity must implement to be managed by ResourceActor.
///
/// # Async & Context
/// Hooks are async so they can talk to other actors. The `Context` is passed to
/// `run()` rather than `new()`, which lets actors that depend on each other be
/// constructed first and wired afterwards.
#[async_trait]
pub trait ActorEntity: Clone + Debug + Send + Sync + 'static {
    /// The unique identifier for this entity.
    /// Must be convertible from u32 for automatic ID generation, and ordered so
    /// listings come back in a stable order.
    type Id: Ord + Clone + Send + Sync + Display + Debug + From<u32>;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// Domain commands understood by this entity.
    type Action: Send + Sync + Debug;

    /// The result type returned by actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// One error enum for the whole entity.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full Entity from the ID and Payload.
    /// This is called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Called after construction and before the entity is stored.
    /// An error here discards the new entity.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called immediately before the entity is removed from the system.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Handle a domain command.
    ///
    /// The actor runs this against a staged clone of the stored entity. The
    /// clone replaces the stored value only when this returns `Ok`, so an
    /// error never leaves a half-applied command behind.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
