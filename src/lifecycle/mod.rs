//! # System Lifecycle & Orchestration
//!
//! Creates the actors, injects their context, and tears them down.
//!
//! ## Dependency injection via context
//!
//! Actors are built first and receive their dependencies in `run(context)`:
//!
//! ```rust,ignore
//! impl ActorEntity for StaffMember {
//!     type Context = ();
//! }
//!
//! impl ActorEntity for Order {
//!     type Context = OrderContext; // workflow settings + notifier
//! }
//! ```
//!
//! ## Graceful shutdown
//!
//! 1. **Drop all clients**, closing the sending side of each mailbox.
//! 2. **Actors drain** their queue, log their final size and return.
//! 3. **Await** every actor task.
//!
//! ## Also here
//!
//! - [`config`]: [`SystemConfig`] from the environment.
//! - [`notifications`]: the [`Notifier`] broadcast and per-staff
//!   [`NotificationFeed`]s.
//! - [`tracing`](mod@tracing): [`setup_tracing`].

pub mod config;
pub mod notifications;
pub mod order_system;
pub mod tracing;

pub use config::*;
pub use notifications::*;
pub use order_system::*;
pub use self::tracing::*;
