//! The order aggregate's single write path.
//!
//! [`Order::apply_transition`] runs the lock guard, the table guard, the item
//! edit and reconciliation, then builds the successor order. It borrows the
//! current order immutably, so a rejected request cannot leave a trace.

use super::intake::validate_items;
use super::lock::{self, LockPolicy};
use super::reconcile::{self, ReconcilePass, Reconciliation};
use super::state_machine::{self, Effect, ItemEdit, Transition, TransitionRule};
use crate::model::{
    normalize_quantity, Actor, HistoryEntry, Order, PaymentMethod, Product, ProductId,
};
use crate::order_actor::OrderError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

pub const DEFAULT_RETURN_REASON: &str = "returned by customer at delivery";

/// Knobs the workflow reads but never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSettings {
    pub lock: LockPolicy,
    /// Reason stamped on delivery returns.
    pub return_reason: String,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            lock: LockPolicy::default(),
            return_reason: DEFAULT_RETURN_REASON.to_string(),
        }
    }
}

/// One request to move an order along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub transition: Transition,
    pub actor: Actor,
    /// The caller's working copy, for transitions that edit items.
    #[serde(default)]
    pub items: Option<Vec<Product>>,
    #[serde(default)]
    pub note: Option<String>,
}

impl TransitionRequest {
    pub fn new(transition: Transition, actor: Actor) -> Self {
        Self {
            transition,
            actor,
            items: None,
            note: None,
        }
    }

    pub fn with_items(mut self, items: Vec<Product>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

impl Order {
    /// Applies one transition and returns the successor order.
    ///
    /// Order of checks: another actor's live lock (`Locked`), the table guard
    /// (`Forbidden`), the item list (`InvalidInput` / `NotFound`), the
    /// checklist (`Forbidden`). On success history gains the reconciliation
    /// lines followed by one primary line, and the actor's own lock is
    /// released.
    pub fn apply_transition(
        &self,
        request: &TransitionRequest,
        now: DateTime<Utc>,
        settings: &WorkflowSettings,
    ) -> Result<Order, OrderError> {
        let result = self.transition_inner(request, now, settings);
        match &result {
            Ok(next) => info!(
                order_id = %self.id,
                transition = ?request.transition,
                status = %next.status,
                actor = %request.actor.name,
                "Transition applied"
            ),
            Err(e) => warn!(
                order_id = %self.id,
                transition = ?request.transition,
                actor = %request.actor.name,
                error = %e,
                "Transition rejected"
            ),
        }
        result
    }

    fn transition_inner(
        &self,
        request: &TransitionRequest,
        now: DateTime<Utc>,
        settings: &WorkflowSettings,
    ) -> Result<Order, OrderError> {
        let actor = &request.actor;
        if let Some(holder) = lock::blocking_holder(&self.work_lock, actor, now, &settings.lock) {
            return Err(OrderError::Locked {
                holder: holder.to_string(),
            });
        }
        let rule = state_machine::check(self, request.transition, actor)?;
        let (products, reconciliation) = self.edit_items(rule, request.items.as_deref(), settings)?;

        let mut next = self.clone();
        reconciliation.apply_to(&mut next.missing_products, &mut next.returned_products);
        next.products = products
            .into_iter()
            .map(|mut p| {
                p.checked = false;
                p
            })
            .collect();
        next.history.extend(
            reconciliation
                .history
                .into_iter()
                .map(|line| HistoryEntry::new(line, actor.name.as_str(), now)),
        );
        next.history.push(
            HistoryEntry::new(rule.history, actor.name.as_str(), now)
                .with_note(request.note.as_deref()),
        );
        next.status = rule.to;
        next.apply_effect(rule.effect, actor);
        lock::release(&mut next.work_lock, Some(actor));

        Ok(next)
    }

    fn edit_items(
        &self,
        rule: &TransitionRule,
        items: Option<&[Product]>,
        settings: &WorkflowSettings,
    ) -> Result<(Vec<Product>, Reconciliation), OrderError> {
        let required = || {
            items.ok_or_else(|| {
                OrderError::invalid(format!("{} needs the edited product list", rule.label))
            })
        };

        match rule.items {
            ItemEdit::None => {
                if items.is_some() {
                    return Err(OrderError::invalid(format!(
                        "{} does not accept product changes",
                        rule.label
                    )));
                }
                Ok((self.products.clone(), Reconciliation::default()))
            }
            ItemEdit::Overwrite => {
                let mut products = normalized(required()?);
                validate_items(&products)?;
                reconcile::rebase(&mut products);
                Ok((products, Reconciliation::default()))
            }
            ItemEdit::Pass(ReconcilePass::InvoiceRecalc) => {
                let mut products = normalized(required()?);
                validate_items(&products)?;
                // Baselines come from the committed items, never from the caller.
                let baselines: HashMap<&ProductId, Option<f64>> = self
                    .products
                    .iter()
                    .map(|p| (&p.id, p.original_quantity))
                    .collect();
                for p in &mut products {
                    p.original_quantity = baselines.get(&p.id).copied().flatten();
                }
                let reconciliation = reconcile::reconcile(
                    &self.products,
                    &products,
                    &self.missing_products,
                    ReconcilePass::InvoiceRecalc,
                    &settings.return_reason,
                );
                reconcile::rebase(&mut products);
                Ok((products, reconciliation))
            }
            ItemEdit::Pass(pass) => {
                let working = self.merge_recount(required()?)?;
                let unchecked = working.iter().filter(|p| !p.checked).count();
                if unchecked > 0 {
                    return Err(OrderError::forbidden(format!(
                        "{unchecked} product(s) still unchecked"
                    )));
                }
                let reconciliation = reconcile::reconcile(
                    &self.products,
                    &working,
                    &self.missing_products,
                    pass,
                    &settings.return_reason,
                );
                Ok((working, reconciliation))
            }
        }
    }

    /// Lays a fulfillment recount over the committed items. Only quantity and
    /// tick are taken from the caller; the list itself cannot change.
    fn merge_recount(&self, counted: &[Product]) -> Result<Vec<Product>, OrderError> {
        let mut by_id: HashMap<&ProductId, &Product> = HashMap::new();
        for item in counted {
            if self.product(&item.id).is_none() {
                return Err(OrderError::NotFound(format!("product {}", item.id)));
            }
            if by_id.insert(&item.id, item).is_some() {
                return Err(OrderError::invalid(format!("duplicate product id {}", item.id)));
            }
            let quantity = normalize_quantity(item.quantity);
            if !quantity.is_finite() || quantity < 0.0 {
                return Err(OrderError::invalid(format!(
                    "{} cannot have quantity {}",
                    item.name, item.quantity
                )));
            }
        }

        self.products
            .iter()
            .map(|committed| {
                let counted = by_id.get(&committed.id).ok_or_else(|| {
                    OrderError::invalid(format!("{} is missing from the count", committed.name))
                })?;
                let mut merged = committed.clone();
                merged.quantity = normalize_quantity(counted.quantity);
                merged.checked = counted.checked;
                Ok(merged)
            })
            .collect()
    }

    fn apply_effect(&mut self, effect: Effect, actor: &Actor) {
        match effect {
            Effect::None => {}
            Effect::AssignPicker => self.armed_by = Some(actor.name.clone()),
            Effect::AssignVerifier => self.controlled_by = Some(actor.name.clone()),
            Effect::SettleCash => {
                self.paid = true;
                self.payment_method = Some(PaymentMethod::Cash);
                self.awaiting_transfer_verification = false;
            }
            Effect::AwaitTransfer => {
                self.payment_method = Some(PaymentMethod::Transfer);
                self.awaiting_transfer_verification = true;
            }
            Effect::SettleTransfer => {
                self.paid = true;
                self.payment_method = Some(PaymentMethod::Transfer);
                self.awaiting_transfer_verification = false;
            }
        }
    }
}

/// Trims text fields, rounds quantities and gives blank ids a fresh one.
fn normalized(items: &[Product]) -> Vec<Product> {
    items
        .iter()
        .cloned()
        .map(|mut p| {
            p.name = p.name.trim().to_string();
            p.code = p
                .code
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty());
            p.quantity = normalize_quantity(p.quantity);
            if p.id.0.trim().is_empty() {
                p.id = ProductId::generate();
            }
            p
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MissingEntry, OrderCreate, OrderId, OrderStatus, ProductDraft};
    use crate::workflow::lock::LockPolicy;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_710_000_000, 0).unwrap()
    }

    fn settings() -> WorkflowSettings {
        WorkflowSettings::default()
    }

    fn lucho() -> Actor {
        Actor::fulfillment("Lucho")
    }

    fn franco() -> Actor {
        Actor::fulfillment("Franco")
    }

    fn vale() -> Actor {
        Actor::coordinator("Vale")
    }

    fn new_order() -> Order {
        let create = OrderCreate::new("Almacen Sur", vale())
            .product(ProductDraft::new("A", 10.0).with_id("a"))
            .product(ProductDraft::new("B", 4.0).with_id("b"));
        Order::open(OrderId(1), create, t0()).unwrap()
    }

    fn count(order: &Order, quantities: &[(&str, f64)]) -> Vec<Product> {
        let mut items = order.working_copy();
        for item in &mut items {
            if let Some((_, q)) = quantities.iter().find(|(id, _)| *id == item.id.0) {
                item.quantity = *q;
            }
            item.checked = true;
        }
        items
    }

    fn step(order: &Order, transition: Transition, actor: Actor, items: Option<Vec<Product>>) -> Order {
        let mut request = TransitionRequest::new(transition, actor);
        request.items = items;
        order.apply_transition(&request, t0(), &settings()).unwrap()
    }

    fn picked() -> Order {
        let mut order = new_order();
        order.acquire_lock(&lucho(), t0(), &LockPolicy::default()).unwrap();
        let items = count(&order, &[("a", 8.0)]);
        step(&order, Transition::ConfirmPick, lucho(), Some(items))
    }

    fn controlled() -> Order {
        let order = picked();
        let items = count(&order, &[]);
        step(&order, Transition::ConfirmPickControl, franco(), Some(items))
    }

    #[test]
    fn pick_records_missing_assigns_picker_and_clears_lock() {
        let order = picked();

        assert_eq!(order.status(), OrderStatus::Armado);
        assert_eq!(order.armed_by(), Some("Lucho"));
        assert!(order.work_lock().is_none());
        assert_eq!(order.missing_products().len(), 1);
        assert_eq!(order.missing_products()[0].product_name, "A");
        assert_eq!(order.missing_products()[0].quantity, 2.0);
        assert!(order.products().iter().all(|p| !p.checked));

        let actions: Vec<_> = order.history().iter().map(|h| h.action.as_str()).collect();
        assert_eq!(
            actions,
            [
                "Budget created, order ready for picking",
                "Quantity updated: A from 10 to 8 (2 missing)",
                "Order picked"
            ]
        );
    }

    #[test]
    fn locked_order_rejects_other_fulfillment_actor() {
        let mut order = new_order();
        order.acquire_lock(&lucho(), t0(), &LockPolicy::default()).unwrap();
        let items = count(&order, &[]);

        let err = order
            .apply_transition(
                &TransitionRequest::new(Transition::ConfirmPick, franco()).with_items(items),
                t0(),
                &settings(),
            )
            .unwrap_err();
        assert_eq!(err, OrderError::Locked { holder: "Lucho".into() });
    }

    #[test]
    fn expired_lease_does_not_block() {
        let mut order = new_order();
        order.acquire_lock(&lucho(), t0(), &LockPolicy::default()).unwrap();
        let settings = WorkflowSettings {
            lock: LockPolicy::with_lease(Duration::minutes(10)),
            ..WorkflowSettings::default()
        };
        let request =
            TransitionRequest::new(Transition::ConfirmPick, franco()).with_items(count(&order, &[]));

        assert!(order.apply_transition(&request, t0() + Duration::minutes(5), &settings).is_err());
        let next = order
            .apply_transition(&request, t0() + Duration::minutes(11), &settings)
            .unwrap();
        assert_eq!(next.armed_by(), Some("Franco"));
        // Lucho's stale claim is not Franco's to clear.
        assert_eq!(next.work_lock().map(|l| l.holder.as_str()), Some("Lucho"));
    }

    #[test]
    fn unchecked_items_block_a_pass() {
        let order = new_order();
        let mut items = count(&order, &[]);
        items[1].checked = false;

        let err = order
            .apply_transition(
                &TransitionRequest::new(Transition::ConfirmPick, lucho()).with_items(items),
                t0(),
                &settings(),
            )
            .unwrap_err();
        assert!(matches!(err, OrderError::Forbidden(_)));
    }

    #[test]
    fn recount_cannot_add_or_drop_items() {
        let order = new_order();

        let mut added = count(&order, &[]);
        added.push(Product::new("zzz", "Intruder", 1.0));
        let request = TransitionRequest::new(Transition::ConfirmPick, lucho()).with_items(added);
        assert!(matches!(
            order.apply_transition(&request, t0(), &settings()),
            Err(OrderError::NotFound(_))
        ));

        let mut dropped = count(&order, &[]);
        dropped.pop();
        let request = TransitionRequest::new(Transition::ConfirmPick, lucho()).with_items(dropped);
        assert!(matches!(
            order.apply_transition(&request, t0(), &settings()),
            Err(OrderError::InvalidInput(_))
        ));

        let request = TransitionRequest::new(Transition::ConfirmPick, lucho())
            .with_items(count(&order, &[("a", -1.0)]));
        assert!(matches!(
            order.apply_transition(&request, t0(), &settings()),
            Err(OrderError::InvalidInput(_))
        ));
    }

    #[test]
    fn recount_rejects_quantities_that_overflow() {
        let order = new_order();
        let request = TransitionRequest::new(Transition::ConfirmPick, lucho())
            .with_items(count(&order, &[("a", 1e303)]));
        assert!(matches!(
            order.apply_transition(&request, t0(), &settings()),
            Err(OrderError::InvalidInput(_))
        ));
    }

    #[test]
    fn recount_keeps_committed_names_and_baselines() {
        let order = new_order();
        let mut items = count(&order, &[("a", 0.0)]);
        items[0].name = "Renamed".into();
        items[0].original_quantity = Some(0.0);

        let next = step(&order, Transition::ConfirmPick, lucho(), Some(items));
        assert_eq!(next.products()[0].name, "A");
        assert_eq!(next.products()[0].original_quantity, Some(10.0));
        assert_eq!(next.products()[0].quantity, 0.0);
        assert_eq!(next.missing_products()[0].quantity, 10.0);
    }

    #[test]
    fn failed_transition_leaves_order_untouched() {
        let order = picked();
        let before = order.clone();

        let request = TransitionRequest::new(Transition::ConfirmPickControl, lucho())
            .with_items(count(&order, &[("a", 10.0)]));
        assert!(order.apply_transition(&request, t0(), &settings()).is_err());
        assert_eq!(order, before);
    }

    #[test]
    fn control_updates_missing_and_assigns_verifier() {
        let order = picked();
        let items = count(&order, &[("a", 9.0)]);
        let next = step(&order, Transition::ConfirmPickControl, franco(), Some(items));

        assert_eq!(next.status(), OrderStatus::ArmadoControlado);
        assert_eq!(next.controlled_by(), Some("Franco"));
        assert_eq!(next.missing_products()[0].quantity, 1.0);
        assert_eq!(next.history().len(), order.history().len() + 2);
    }

    #[test]
    fn invoice_edit_resolves_missing_and_rebases() {
        let order = controlled();
        let mut items = order.working_copy();
        items[0].quantity = 10.0;

        let next = step(&order, Transition::EditInvoice, vale(), Some(items));
        assert_eq!(next.status(), OrderStatus::ArmadoControlado);
        assert!(next.missing_products().is_empty());
        assert_eq!(next.products()[0].original_quantity, Some(10.0));

        let actions: Vec<_> = next.history().iter().rev().take(2).map(|h| h.action.as_str()).collect();
        assert_eq!(
            actions,
            [
                "Invoice updated - products and missing quantities recalculated",
                "Missing resolved: A - 2 found"
            ]
        );
    }

    #[test]
    fn invoice_edit_ignores_caller_baselines_and_accepts_new_rows() {
        let order = controlled();
        let mut items = order.working_copy();
        items[0].original_quantity = Some(8.0);
        items.push(Product::new("c", "C", 3.0));

        let next = step(&order, Transition::EditInvoice, vale(), Some(items));
        // A still measures against its committed baseline of 10.
        assert_eq!(next.missing_products()[0].quantity, 2.0);
        assert_eq!(next.products().len(), 3);
        assert_eq!(next.products()[2].original_quantity, Some(3.0));
    }

    #[test]
    fn budget_edit_overwrites_and_validates() {
        let order = new_order();
        let items = vec![
            Product::new("a", "A", 12.0),
            Product {
                original_quantity: None,
                ..Product::new("n", " New ", 1.0)
            },
        ];
        let next = step(&order, Transition::EditBudget, vale(), Some(items));
        assert_eq!(next.status(), OrderStatus::EnArmado);
        assert_eq!(next.products().len(), 2);
        assert_eq!(next.products()[1].name, "New");
        assert_eq!(next.products()[1].original_quantity, Some(1.0));
        assert_eq!(next.history().last().unwrap().action, "Budget updated");

        let request = TransitionRequest::new(Transition::EditBudget, vale()).with_items(vec![]);
        assert!(matches!(
            order.apply_transition(&request, t0(), &settings()),
            Err(OrderError::InvalidInput(_))
        ));
    }

    #[test]
    fn coordinator_edits_ignore_the_lock() {
        let mut order = new_order();
        order.acquire_lock(&lucho(), t0(), &LockPolicy::default()).unwrap();
        let next = step(&order, Transition::EditBudget, vale(), Some(order.working_copy()));
        assert_eq!(next.work_lock().map(|l| l.holder.as_str()), Some("Lucho"));
    }

    #[test]
    fn plain_transitions_refuse_items() {
        let order = controlled();
        let request =
            TransitionRequest::new(Transition::Invoice, vale()).with_items(order.working_copy());
        assert!(matches!(
            order.apply_transition(&request, t0(), &settings()),
            Err(OrderError::InvalidInput(_))
        ));
    }

    fn in_transit() -> Order {
        let mut order = controlled();
        order = step(&order, Transition::Invoice, vale(), None);
        let items = count(&order, &[]);
        order = step(&order, Transition::ConfirmInvoiceControl, lucho(), Some(items));
        step(&order, Transition::Dispatch, lucho(), None)
    }

    #[test]
    fn delivery_records_returns_only() {
        let order = in_transit();
        let missing_before: Vec<MissingEntry> = order.missing_products().to_vec();
        let items = count(&order, &[("b", 1.0)]);

        let next = step(&order, Transition::ConfirmDelivery, lucho(), Some(items));
        assert_eq!(next.status(), OrderStatus::Entregado);
        assert_eq!(next.missing_products(), missing_before.as_slice());
        assert_eq!(next.returned_products().len(), 1);
        assert_eq!(next.returned_products()[0].quantity, 3.0);
        assert_eq!(next.returned_products()[0].reason, DEFAULT_RETURN_REASON);
    }

    #[test]
    fn delivery_return_includes_picking_shortfall() {
        let order = in_transit();
        assert_eq!(order.products()[0].quantity, 8.0);
        let items = count(&order, &[("a", 7.0)]);

        let next = step(&order, Transition::ConfirmDelivery, lucho(), Some(items));
        assert_eq!(next.returned_products().len(), 1);
        assert_eq!(next.returned_products()[0].product_name, "A");
        assert_eq!(next.returned_products()[0].quantity, 3.0);
        assert_eq!(next.missing_products()[0].quantity, 2.0);
    }

    #[test]
    fn cash_payment_settles_the_order() {
        let order = in_transit();
        let items = count(&order, &[]);
        let order = step(&order, Transition::ConfirmDelivery, lucho(), Some(items));
        let paid = step(&order, Transition::PayCash, lucho(), None);

        assert_eq!(paid.status(), OrderStatus::Pagado);
        assert!(paid.is_paid());
        assert_eq!(paid.payment_method(), Some(PaymentMethod::Cash));
    }

    #[test]
    fn transfer_is_reported_then_verified() {
        let delivered = {
            let order = in_transit();
            let items = count(&order, &[]);
            step(&order, Transition::ConfirmDelivery, lucho(), Some(items))
        };

        let reported = step(&delivered, Transition::ReportTransfer, lucho(), None);
        assert_eq!(reported.status(), OrderStatus::Entregado);
        assert!(reported.is_awaiting_transfer_verification());
        assert!(!reported.is_paid());

        let again = TransitionRequest::new(Transition::ReportTransfer, vale());
        assert!(matches!(
            reported.apply_transition(&again, t0(), &settings()),
            Err(OrderError::Forbidden(_))
        ));

        let verified = step(&reported, Transition::VerifyTransfer, vale(), None);
        assert_eq!(verified.status(), OrderStatus::Pagado);
        assert!(verified.is_paid());
        assert!(!verified.is_awaiting_transfer_verification());
        assert_eq!(verified.payment_method(), Some(PaymentMethod::Transfer));
    }

    #[test]
    fn note_is_attached_to_primary_entry() {
        let order = new_order();
        let request = TransitionRequest::new(Transition::ConfirmPick, lucho())
            .with_items(count(&order, &[]))
            .with_note("box 3 is heavy");
        let next = order.apply_transition(&request, t0(), &settings()).unwrap();

        let last = next.history().last().unwrap();
        assert_eq!(last.action, "Order picked");
        assert_eq!(last.note.as_deref(), Some("box 3 is heavy"));
        assert_eq!(next.history().len(), 2);
    }
}
