//! # Actor Framework
//!
//! A small runtime for hosting stateful entities behind Tokio actors. Each
//! entity type gets one [`ResourceActor`] task that owns every instance of that
//! type and processes requests strictly one at a time; callers talk to it through
//! a cloneable [`ResourceClient`].
//!
//! ## Layers
//!
//! 1. **Entity** ([`ActorEntity`]): the domain type, its creation payload, its
//!    commands and its error type.
//! 2. **Runtime** ([`ResourceActor`]): mailbox loop, id assignment, storage,
//!    logging.
//! 3. **Interface** ([`ResourceClient`], [`ActorClient`]): typed request/reply
//!    calls, wrapped by domain clients.
//!
//! ## Guarantees
//!
//! - Requests to one actor are applied in arrival order, never concurrently.
//!   Two commands against the same entity therefore cannot interleave.
//! - Commands run on a staged copy of the entity. If the handler returns an
//!   error the stored entity is untouched.
//! - Entity errors cross the channel boxed inside
//!   [`FrameworkError::EntityError`]; [`FrameworkError::downcast_entity`]
//!   gives the typed error back.
//!
//! ## Context injection
//!
//! Dependencies are passed to [`ResourceActor::run`], not to `new`. Build every
//! actor first, then start each one with the clients it needs:
//!
//! ```rust
//! use actor_framework::{ActorEntity, ResourceActor, ResourceClient};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)] struct Crew { id: u32 }
//! #[derive(Debug)] struct CrewCreate;
//! #[derive(Debug)] enum CrewAction {}
//! #[derive(Debug, thiserror::Error)] #[error("crew error")] struct CrewError;
//!
//! #[async_trait]
//! impl ActorEntity for Crew {
//!     type Id = u32; type Create = CrewCreate; type Action = CrewAction;
//!     type ActionResult = (); type Context = (); type Error = CrewError;
//!     fn from_create_params(id: u32, _: CrewCreate) -> Result<Self, Self::Error> { Ok(Self { id }) }
//!     async fn handle_action(&mut self, a: CrewAction, _: &()) -> Result<(), Self::Error> { match a {} }
//! }
//!
//! #[derive(Clone, Debug)] struct Route { id: u32 }
//! #[derive(Debug)] struct RouteCreate;
//! #[derive(Debug)] enum RouteAction {}
//! #[derive(Debug, thiserror::Error)] #[error("route error")] struct RouteError;
//!
//! #[async_trait]
//! impl ActorEntity for Route {
//!     type Id = u32; type Create = RouteCreate; type Action = RouteAction;
//!     type ActionResult = (); type Error = RouteError;
//!     // Routes can look crews up while handling their own requests.
//!     type Context = ResourceClient<Crew>;
//!     fn from_create_params(id: u32, _: RouteCreate) -> Result<Self, Self::Error> { Ok(Self { id }) }
//!     async fn handle_action(&mut self, a: RouteAction, _: &ResourceClient<Crew>) -> Result<(), Self::Error> { match a {} }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (crew_actor, crew_client) = ResourceActor::<Crew>::new(10);
//!     let (route_actor, route_client) = ResourceActor::<Route>::new(10);
//!
//!     tokio::spawn(crew_actor.run(()));
//!     tokio::spawn(route_actor.run(crew_client.clone()));
//!
//!     let id = route_client.create(RouteCreate).await.unwrap();
//!     assert_eq!(route_client.list().await.unwrap().len(), 1);
//!     assert!(route_client.get(id).await.unwrap().is_some());
//! }
//! ```
//!
//! ## Testing
//!
//! The [`mock`] module provides [`mock::MockClient`] (queued expectations)
//! and [`mock::create_mock_client`] (raw mailbox access) for testing code that
//! sits on top of a client without running the actor.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
