//! The transition table and its guards.
//!
//! Every status change, and both in-place item edits, is one row of
//! [`TRANSITION_TABLE`]. [`check`] decides whether a row may fire for a given
//! order and actor; the aggregate carries out whatever the row describes.

use super::reconcile::ReconcilePass;
use crate::model::{Actor, Order, OrderStatus, Role};
use crate::order_actor::OrderError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    ConfirmPick,
    ConfirmPickControl,
    Invoice,
    ConfirmInvoiceControl,
    Dispatch,
    ConfirmDelivery,
    PayCash,
    ReportTransfer,
    VerifyTransfer,
    /// Coordinator rewrites the budget at `en_armado`.
    EditBudget,
    /// Coordinator rewrites the invoice at `armado_controlado`.
    EditInvoice,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(rule(*self).label)
    }
}

/// Extra condition on top of status and role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    None,
    /// The controller must not be the picker.
    NotPicker,
    NoTransferPending,
    TransferPending,
}

/// Assignment and payment fields written on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    AssignPicker,
    AssignVerifier,
    SettleCash,
    AwaitTransfer,
    SettleTransfer,
}

/// What the transition does with the caller's line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemEdit {
    /// Items must not be supplied.
    None,
    /// Fulfillment recount: quantities and ticks merge onto the committed
    /// items, then the pass reconciles them.
    Pass(ReconcilePass),
    /// Coordinator edit: the supplied list replaces the items and becomes the
    /// new baseline.
    Overwrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub transition: Transition,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub roles: &'static [Role],
    pub guard: Guard,
    pub items: ItemEdit,
    pub effect: Effect,
    /// Primary history line.
    pub history: &'static str,
    /// Short name offered to the acting user.
    pub label: &'static str,
}

impl TransitionRule {
    pub fn allows(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Whether the item list must be fully ticked before firing.
    pub fn needs_checklist(&self) -> bool {
        matches!(
            self.items,
            ItemEdit::Pass(ReconcilePass::Pick | ReconcilePass::Control | ReconcilePass::Delivery)
        )
    }
}

const FULFILLMENT: &[Role] = &[Role::Fulfillment];
const COORDINATOR: &[Role] = &[Role::Coordinator];
const ANYONE: &[Role] = &[Role::Fulfillment, Role::Coordinator];

pub static TRANSITION_TABLE: [TransitionRule; 11] = [
    TransitionRule {
        transition: Transition::ConfirmPick,
        from: OrderStatus::EnArmado,
        to: OrderStatus::Armado,
        roles: FULFILLMENT,
        guard: Guard::None,
        items: ItemEdit::Pass(ReconcilePass::Pick),
        effect: Effect::AssignPicker,
        history: "Order picked",
        label: "Pick order",
    },
    TransitionRule {
        transition: Transition::ConfirmPickControl,
        from: OrderStatus::Armado,
        to: OrderStatus::ArmadoControlado,
        roles: FULFILLMENT,
        guard: Guard::NotPicker,
        items: ItemEdit::Pass(ReconcilePass::Control),
        effect: Effect::AssignVerifier,
        history: "Picking controlled",
        label: "Control picking",
    },
    TransitionRule {
        transition: Transition::Invoice,
        from: OrderStatus::ArmadoControlado,
        to: OrderStatus::Facturado,
        roles: COORDINATOR,
        guard: Guard::None,
        items: ItemEdit::None,
        effect: Effect::None,
        history: "Order invoiced",
        label: "Invoice order",
    },
    TransitionRule {
        transition: Transition::ConfirmInvoiceControl,
        from: OrderStatus::Facturado,
        to: OrderStatus::FacturaControlada,
        roles: FULFILLMENT,
        guard: Guard::None,
        items: ItemEdit::Pass(ReconcilePass::Control),
        effect: Effect::None,
        history: "Invoice controlled",
        label: "Control invoice",
    },
    TransitionRule {
        transition: Transition::Dispatch,
        from: OrderStatus::FacturaControlada,
        to: OrderStatus::EnTransito,
        roles: FULFILLMENT,
        guard: Guard::None,
        items: ItemEdit::None,
        effect: Effect::None,
        history: "Order in transit",
        label: "Mark in transit",
    },
    TransitionRule {
        transition: Transition::ConfirmDelivery,
        from: OrderStatus::EnTransito,
        to: OrderStatus::Entregado,
        roles: FULFILLMENT,
        guard: Guard::None,
        items: ItemEdit::Pass(ReconcilePass::Delivery),
        effect: Effect::None,
        history: "Order delivered",
        label: "Confirm delivery",
    },
    TransitionRule {
        transition: Transition::PayCash,
        from: OrderStatus::Entregado,
        to: OrderStatus::Pagado,
        roles: FULFILLMENT,
        guard: Guard::None,
        items: ItemEdit::None,
        effect: Effect::SettleCash,
        history: "Order paid in cash",
        label: "Cash payment",
    },
    TransitionRule {
        transition: Transition::ReportTransfer,
        from: OrderStatus::Entregado,
        to: OrderStatus::Entregado,
        roles: ANYONE,
        guard: Guard::NoTransferPending,
        items: ItemEdit::None,
        effect: Effect::AwaitTransfer,
        history: "Transfer reported - awaiting verification",
        label: "Report transfer",
    },
    TransitionRule {
        transition: Transition::VerifyTransfer,
        from: OrderStatus::Entregado,
        to: OrderStatus::Pagado,
        roles: COORDINATOR,
        guard: Guard::TransferPending,
        items: ItemEdit::None,
        effect: Effect::SettleTransfer,
        history: "Transfer verified and confirmed",
        label: "Verify transfer",
    },
    TransitionRule {
        transition: Transition::EditBudget,
        from: OrderStatus::EnArmado,
        to: OrderStatus::EnArmado,
        roles: COORDINATOR,
        guard: Guard::None,
        items: ItemEdit::Overwrite,
        effect: Effect::None,
        history: "Budget updated",
        label: "Edit budget",
    },
    TransitionRule {
        transition: Transition::EditInvoice,
        from: OrderStatus::ArmadoControlado,
        to: OrderStatus::ArmadoControlado,
        roles: COORDINATOR,
        guard: Guard::None,
        items: ItemEdit::Pass(ReconcilePass::InvoiceRecalc),
        effect: Effect::None,
        history: "Invoice updated - products and missing quantities recalculated",
        label: "Edit invoice",
    },
];

/// The table row for `transition`.
pub fn rule(transition: Transition) -> &'static TransitionRule {
    let index = match transition {
        Transition::ConfirmPick => 0,
        Transition::ConfirmPickControl => 1,
        Transition::Invoice => 2,
        Transition::ConfirmInvoiceControl => 3,
        Transition::Dispatch => 4,
        Transition::ConfirmDelivery => 5,
        Transition::PayCash => 6,
        Transition::ReportTransfer => 7,
        Transition::VerifyTransfer => 8,
        Transition::EditBudget => 9,
        Transition::EditInvoice => 10,
    };
    &TRANSITION_TABLE[index]
}

/// Status, role and guard checks. Lock and checklist checks live in the
/// aggregate.
pub fn check(
    order: &Order,
    transition: Transition,
    actor: &Actor,
) -> Result<&'static TransitionRule, OrderError> {
    let rule = rule(transition);

    if order.status.is_terminal() {
        return Err(OrderError::forbidden(format!(
            "{} is {} and can no longer change",
            order.id, order.status
        )));
    }
    if order.status != rule.from {
        return Err(OrderError::forbidden(format!(
            "{} requires status {}, order is {}",
            rule.label, rule.from, order.status
        )));
    }
    if !rule.allows(actor.role) {
        return Err(OrderError::forbidden(format!(
            "{} is not allowed for role {}",
            rule.label, actor.role
        )));
    }
    match rule.guard {
        Guard::None => {}
        Guard::NotPicker => {
            if order.armed_by.as_deref() == Some(actor.name.as_str()) {
                return Err(OrderError::forbidden(format!(
                    "{} picked this order and cannot control it",
                    actor.name
                )));
            }
        }
        Guard::NoTransferPending => {
            if order.awaiting_transfer_verification {
                return Err(OrderError::forbidden(
                    "a transfer is already awaiting verification",
                ));
            }
        }
        Guard::TransferPending => {
            if !order.awaiting_transfer_verification {
                return Err(OrderError::forbidden("no transfer awaiting verification"));
            }
        }
    }
    Ok(rule)
}
