//! Commands understood by the Order actor beyond create/get/list/delete.
//!
//! Each variant is applied by [`Order::handle_action`](crate::model::Order)
//! against a staged copy of the stored order, so a rejected command changes
//! nothing.

use crate::model::{Actor, Order, Product, WorkLock};
use crate::workflow::{NextAction, TransitionRequest};

#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Claim the order's line items for editing.
    AcquireLock { actor: Actor },
    /// Drop the claim. `None` clears it whoever holds it.
    ReleaseLock { actor: Option<Actor> },
    QueryLock,
    Transition(TransitionRequest),
    /// Offered transitions for `actor`, judged against its working copy.
    NextActions {
        actor: Actor,
        working: Option<Vec<Product>>,
    },
}

/// Results from OrderActions - variants match 1:1 with OrderAction
#[derive(Debug, Clone)]
pub enum OrderActionResult {
    /// The claim now on the order. Coordinators never take one.
    AcquireLock(Option<WorkLock>),
    /// Whether a claim was cleared.
    ReleaseLock(bool),
    QueryLock(Option<WorkLock>),
    /// The committed successor order.
    Transition(Box<Order>),
    NextActions(Vec<NextAction>),
}
