//! Which transitions an actor may be offered right now.

use super::lock::{self, LockPolicy};
use super::state_machine::{self, Transition, TRANSITION_TABLE};
use crate::model::{Actor, Order, Product};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One offered transition and what currently stands in its way.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextAction {
    pub transition: Transition,
    pub label: &'static str,
    pub is_blocked_by_lock: bool,
    /// Who holds the lock, when it blocks.
    pub lock_holder: Option<String>,
    pub is_blocked_by_incomplete_checklist: bool,
    pub unchecked: usize,
}

impl NextAction {
    pub fn is_invokable(&self) -> bool {
        !self.is_blocked_by_lock && !self.is_blocked_by_incomplete_checklist
    }
}

/// Every transition whose status, role and guard checks pass for `actor`,
/// annotated with lock and checklist blockers.
///
/// `working` is the caller's in-progress copy of the items. Without one the
/// committed items are used, which are never ticked, so checklist transitions
/// show as blocked.
pub fn next_actions(
    order: &Order,
    actor: &Actor,
    working: Option<&[Product]>,
    now: DateTime<Utc>,
    policy: &LockPolicy,
) -> Vec<NextAction> {
    let holder = lock::blocking_holder(&order.work_lock, actor, now, policy);
    let items = working.unwrap_or(order.products.as_slice());

    TRANSITION_TABLE
        .iter()
        .filter(|rule| state_machine::check(order, rule.transition, actor).is_ok())
        .map(|rule| {
            let unchecked = if rule.needs_checklist() {
                items.iter().filter(|p| !p.checked).count()
            } else {
                0
            };
            NextAction {
                transition: rule.transition,
                label: rule.label,
                is_blocked_by_lock: holder.is_some(),
                lock_holder: holder.map(str::to_string),
                is_blocked_by_incomplete_checklist: unchecked > 0,
                unchecked,
            }
        })
        .collect()
}

impl Order {
    pub fn next_actions(
        &self,
        actor: &Actor,
        working: Option<&[Product]>,
        now: DateTime<Utc>,
        policy: &LockPolicy,
    ) -> Vec<NextAction> {
        next_actions(self, actor, working, now, policy)
    }
}
