//! # Order Actor
//!
//! Hosts every [`Order`] in one [`ResourceActor`] task. Because the task takes
//! requests one at a time, two transitions against the same order can never
//! interleave, and each one diffs against the order as last committed.
//!
//! ## Structure
//!
//! - [`actions`] - [`OrderAction`] commands and their results
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation
//!   for [`Order`] and its injected [`OrderContext`]
//! - [`error`] - [`OrderError`]
//! - [`new()`] - factory for the actor and its client
//!
//! ## Usage
//!
//! ```rust
//! use fulfillment_orders::lifecycle::Notifier;
//! use fulfillment_orders::model::{Actor, OrderCreate, ProductDraft};
//! use fulfillment_orders::order_actor::{self, OrderContext};
//! use fulfillment_orders::workflow::WorkflowSettings;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, client) = order_actor::new(32);
//!     let context = OrderContext::new(WorkflowSettings::default(), Notifier::new(16));
//!     tokio::spawn(actor.run(context));
//!
//!     let create = OrderCreate::new("Almacen Sur", Actor::coordinator("Vale"))
//!         .product(ProductDraft::new("Yerba", 10.0));
//!     let id = client.create_order(create).await?;
//!     assert_eq!(id.to_string(), "order_1");
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use entity::*;
pub use error::*;

use crate::clients::OrderClient;
use crate::model::Order;
use actor_framework::ResourceActor;

/// Creates a new Order actor and its client.
pub fn new(capacity: usize) -> (ResourceActor<Order>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(capacity);
    (actor, OrderClient::new(generic_client))
}
