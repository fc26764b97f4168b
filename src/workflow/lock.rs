//! Work lock coordination.
//!
//! One optional [`WorkLock`] per order says which fulfillment actor is editing
//! its line items. Coordinators are never blocked and never take the lock.
//! These are the only functions that write the lock slot.

use crate::model::{Actor, Order, Role, WorkLock};
use crate::order_actor::OrderError;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

/// Lock expiry policy. Without a lease a claim lasts until released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockPolicy {
    pub lease: Option<Duration>,
}

impl LockPolicy {
    pub fn with_lease(lease: Duration) -> Self {
        Self { lease: Some(lease) }
    }

    /// A claim past its lease counts as absent.
    pub fn is_live(&self, lock: &WorkLock, now: DateTime<Utc>) -> bool {
        self.lease.is_none_or(|lease| lock.held_for(now) <= lease)
    }
}

/// Claims `slot` for `actor`.
///
/// Coordinators succeed without touching the slot. A fulfillment actor gets a
/// free or expired slot, keeps a claim it already holds, and is refused with
/// [`OrderError::Locked`] when someone else holds a live claim.
pub fn acquire(
    slot: &mut Option<WorkLock>,
    actor: &Actor,
    now: DateTime<Utc>,
    policy: &LockPolicy,
) -> Result<(), OrderError> {
    if actor.role == Role::Coordinator {
        return Ok(());
    }
    match slot {
        Some(lock) if policy.is_live(lock, now) => {
            if lock.holder == actor.name {
                Ok(())
            } else {
                warn!(holder = %lock.holder, actor = %actor.name, "Lock held by another actor");
                Err(OrderError::Locked {
                    holder: lock.holder.clone(),
                })
            }
        }
        _ => {
            debug!(actor = %actor.name, "Lock acquired");
            *slot = Some(WorkLock::new(actor.name.clone(), now));
            Ok(())
        }
    }
}

/// Clears the claim if `actor` holds it, or unconditionally when no actor is
/// given. Returns whether anything was cleared.
pub fn release(slot: &mut Option<WorkLock>, actor: Option<&Actor>) -> bool {
    let clear = match (slot.as_ref(), actor) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(lock), Some(actor)) => lock.holder == actor.name,
    };
    if clear {
        debug!(holder = ?slot.as_ref().map(|l| &l.holder), "Lock released");
        *slot = None;
    }
    clear
}

/// The live claim, if any.
pub fn query<'a>(
    slot: &'a Option<WorkLock>,
    now: DateTime<Utc>,
    policy: &LockPolicy,
) -> Option<&'a WorkLock> {
    slot.as_ref().filter(|lock| policy.is_live(lock, now))
}

/// The holder that blocks `actor`, if any. Coordinators are never blocked.
pub fn blocking_holder<'a>(
    slot: &'a Option<WorkLock>,
    actor: &Actor,
    now: DateTime<Utc>,
    policy: &LockPolicy,
) -> Option<&'a str> {
    if actor.role == Role::Coordinator {
        return None;
    }
    query(slot, now, policy)
        .filter(|lock| lock.holder != actor.name)
        .map(|lock| lock.holder.as_str())
}

impl Order {
    /// Claims this order for `actor`. Paid orders cannot be claimed.
    pub fn acquire_lock(
        &mut self,
        actor: &Actor,
        now: DateTime<Utc>,
        policy: &LockPolicy,
    ) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::forbidden(format!(
                "{} is {} and can no longer be edited",
                self.id, self.status
            )));
        }
        acquire(&mut self.work_lock, actor, now, policy)
    }

    pub fn release_lock(&mut self, actor: Option<&Actor>) -> bool {
        release(&mut self.work_lock, actor)
    }

    pub fn active_lock(&self, now: DateTime<Utc>, policy: &LockPolicy) -> Option<&WorkLock> {
        query(&self.work_lock, now, policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(minutes: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap() + Duration::minutes(minutes)
    }

    #[test]
    fn fulfillment_actors_exclude_each_other() {
        let lucho = Actor::fulfillment("Lucho");
        let franco = Actor::fulfillment("Franco");
        let policy = LockPolicy::default();
        let mut slot = None;

        acquire(&mut slot, &lucho, at(0), &policy).unwrap();
        assert_eq!(
            acquire(&mut slot, &franco, at(1), &policy),
            Err(OrderError::Locked {
                holder: "Lucho".into()
            })
        );
        // Idempotent for the holder; the original timestamp stays.
        acquire(&mut slot, &lucho, at(5), &policy).unwrap();
        assert_eq!(slot.as_ref().unwrap().since, at(0));
    }

    #[test]
    fn coordinators_pass_without_claiming() {
        let vale = Actor::coordinator("Vale");
        let policy = LockPolicy::default();

        let mut free = None;
        acquire(&mut free, &vale, at(0), &policy).unwrap();
        assert!(free.is_none());

        let mut held = Some(WorkLock::new("Lucho", at(0)));
        acquire(&mut held, &vale, at(1), &policy).unwrap();
        assert_eq!(held.unwrap().holder, "Lucho");
    }

    #[test]
    fn release_only_by_holder_or_admin() {
        let lucho = Actor::fulfillment("Lucho");
        let franco = Actor::fulfillment("Franco");
        let mut slot = Some(WorkLock::new("Lucho", at(0)));

        assert!(!release(&mut slot, Some(&franco)));
        assert!(slot.is_some());
        assert!(release(&mut slot, Some(&lucho)));
        assert!(slot.is_none());

        slot = Some(WorkLock::new("Lucho", at(0)));
        assert!(release(&mut slot, None));
        assert!(!release(&mut slot, None));
    }

    #[test]
    fn without_lease_a_claim_never_expires() {
        let policy = LockPolicy::default();
        let mut slot = Some(WorkLock::new("Lucho", at(0)));
        assert!(query(&slot, at(60 * 24 * 30), &policy).is_some());
        assert!(acquire(&mut slot, &Actor::fulfillment("Negro"), at(60 * 24 * 30), &policy).is_err());
    }

    #[test]
    fn expired_lease_counts_as_absent() {
        let policy = LockPolicy::with_lease(Duration::minutes(30));
        let negro = Actor::fulfillment("Negro");
        let mut slot = Some(WorkLock::new("Lucho", at(0)));

        assert_eq!(blocking_holder(&slot, &negro, at(30), &policy), Some("Lucho"));
        assert_eq!(blocking_holder(&slot, &negro, at(31), &policy), None);
        assert!(query(&slot, at(31), &policy).is_none());

        acquire(&mut slot, &negro, at(31), &policy).unwrap();
        assert_eq!(slot.unwrap(), WorkLock::new("Negro", at(31)));
    }

    #[test]
    fn blocking_holder_ignores_self_and_coordinators() {
        let policy = LockPolicy::default();
        let slot = Some(WorkLock::new("Lucho", at(0)));
        assert_eq!(blocking_holder(&slot, &Actor::fulfillment("Lucho"), at(1), &policy), None);
        assert_eq!(blocking_holder(&slot, &Actor::coordinator("Vale"), at(1), &policy), None);
    }
}
