//! The synchronous order workflow.
//!
//! Nothing here performs I/O or reads the clock; callers pass `now` in. The
//! order actor is the only caller in production and serializes every call
//! against a given order.
//!
//! - [`reconcile`]: diffs a working copy against the committed items and
//!   produces ledger changes plus history lines.
//! - [`lock`]: the per-order work lock.
//! - [`state_machine`]: the transition table and its guards.
//! - [`aggregate`]: [`Order::apply_transition`](crate::model::Order::apply_transition).
//! - [`resolver`]: the transitions currently on offer to an actor.

pub mod aggregate;
pub mod intake;
pub mod lock;
pub mod reconcile;
pub mod resolver;
pub mod state_machine;

pub use aggregate::{TransitionRequest, WorkflowSettings, DEFAULT_RETURN_REASON};
pub use lock::LockPolicy;
pub use reconcile::{reconcile, ReconcilePass, Reconciliation};
pub use resolver::{next_actions, NextAction};
pub use state_machine::{Transition, TransitionRule, TRANSITION_TABLE};
