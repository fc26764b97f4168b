//! Ledger reconciliation.
//!
//! Pure diffing of a working copy against the committed line items. The
//! output is a set of ledger changes plus the audit lines describing them; the
//! caller decides whether to commit them.

use crate::model::{normalize_quantity, MissingEntry, Product, ProductId, ReturnedEntry};
use std::collections::HashMap;
use tracing::debug;

/// Which edit pass produced the working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePass {
    /// First count at `en_armado`.
    Pick,
    /// Recount by a second actor, after picking or after invoicing.
    Control,
    /// Coordinator edit of the invoice; every baselined item is recomputed
    /// and the edited figures become the new baseline.
    InvoiceRecalc,
    /// Count at the customer's door.
    Delivery,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MissingChange {
    /// Insert, or replace the entry for the same product.
    Upsert(MissingEntry),
    Remove(ProductId),
}

/// The outcome of one pass. Nothing has been applied yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub missing: Vec<MissingChange>,
    pub returned: Vec<ReturnedEntry>,
    /// Audit lines in item order.
    pub history: Vec<String>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.returned.is_empty() && self.history.is_empty()
    }

    /// Applies the ledger changes. Upserts keep the position of an existing
    /// entry; new entries go to the end.
    pub fn apply_to(&self, missing: &mut Vec<MissingEntry>, returned: &mut Vec<ReturnedEntry>) {
        for change in &self.missing {
            match change {
                MissingChange::Upsert(entry) => {
                    match missing.iter_mut().find(|m| m.product_id == entry.product_id) {
                        Some(existing) => *existing = entry.clone(),
                        None => missing.push(entry.clone()),
                    }
                }
                MissingChange::Remove(id) => missing.retain(|m| &m.product_id != id),
            }
        }
        returned.extend(self.returned.iter().cloned());
    }
}

/// Diffs `working` against `committed` for the given pass.
///
/// `missing` is the current missing ledger. Items without an
/// `original_quantity` are skipped. Control and delivery only look at ticked
/// items whose quantity differs from the committed one.
pub fn reconcile(
    committed: &[Product],
    working: &[Product],
    missing: &[MissingEntry],
    pass: ReconcilePass,
    return_reason: &str,
) -> Reconciliation {
    let committed: HashMap<&ProductId, &Product> = committed.iter().map(|p| (&p.id, p)).collect();
    let missing: HashMap<&ProductId, f64> =
        missing.iter().map(|m| (&m.product_id, m.quantity)).collect();
    let mut out = Reconciliation::default();

    for item in working {
        let Some(shortfall) = item.shortfall() else {
            continue;
        };
        let before = committed.get(&item.id).map(|c| c.quantity);
        let changed = before.is_some_and(|q| q != item.quantity);

        match pass {
            ReconcilePass::Pick => pick(item, shortfall, missing.get(&item.id).copied(), &mut out),
            ReconcilePass::Control => {
                if let (true, Some(before)) = (item.checked && changed, before) {
                    let lines = out.history.len();
                    recount(item, shortfall, missing.get(&item.id).copied(), &mut out);
                    if out.history.len() == lines {
                        out.history.push(format!(
                            "Quantity adjusted: {} from {} to {}",
                            item.name, before, item.quantity
                        ));
                    }
                }
            }
            ReconcilePass::InvoiceRecalc => {
                recount(item, shortfall, missing.get(&item.id).copied(), &mut out)
            }
            ReconcilePass::Delivery => {
                if item.checked && changed && shortfall > 0.0 {
                    debug!(product = %item.id, returned = shortfall, "Delivery return");
                    out.returned
                        .push(ReturnedEntry::for_product(item, shortfall, return_reason));
                    out.history.push(format!(
                        "Delivery: {} - {} units returned by customer",
                        item.name, shortfall
                    ));
                }
            }
        }
    }

    out
}

fn pick(item: &Product, shortfall: f64, previous: Option<f64>, out: &mut Reconciliation) {
    if item.checked {
        if shortfall > 0.0 {
            debug!(product = %item.id, shortfall, "Missing after pick");
            out.missing
                .push(MissingChange::Upsert(MissingEntry::for_product(item, shortfall)));
        } else if previous.is_some() {
            out.missing.push(MissingChange::Remove(item.id.clone()));
        }
    }

    if shortfall != 0.0 {
        let original = item.original_quantity.unwrap_or(item.quantity);
        let detail = if shortfall > 0.0 {
            format!(" ({shortfall} missing)")
        } else {
            format!(" ({} extra)", -shortfall)
        };
        out.history.push(format!(
            "Quantity updated: {} from {} to {}{}",
            item.name, original, item.quantity, detail
        ));
    }
}

fn recount(item: &Product, shortfall: f64, previous: Option<f64>, out: &mut Reconciliation) {
    match previous {
        Some(prev) if shortfall <= 0.0 => {
            debug!(product = %item.id, prev, "Missing resolved");
            out.missing.push(MissingChange::Remove(item.id.clone()));
            out.history
                .push(format!("Missing resolved: {} - {} found", item.name, prev));
        }
        Some(prev) if shortfall < prev => {
            debug!(product = %item.id, prev, shortfall, "Missing reduced");
            out.missing
                .push(MissingChange::Upsert(MissingEntry::for_product(item, shortfall)));
            out.history.push(format!(
                "Missing reduced: {} from {} to {} ({} found)",
                item.name,
                prev,
                shortfall,
                normalize_quantity(prev - shortfall)
            ));
        }
        Some(prev) if shortfall > prev => {
            debug!(product = %item.id, prev, shortfall, "Missing increased");
            out.missing
                .push(MissingChange::Upsert(MissingEntry::for_product(item, shortfall)));
            out.history.push(format!(
                "Missing increased: {} from {} to {}",
                item.name, prev, shortfall
            ));
        }
        Some(_) => {}
        None if shortfall > 0.0 => {
            debug!(product = %item.id, shortfall, "Missing detected");
            out.missing
                .push(MissingChange::Upsert(MissingEntry::for_product(item, shortfall)));
            out.history.push(format!(
                "New missing detected: {} - {}",
                item.name, shortfall
            ));
        }
        None => {}
    }

    if shortfall < 0.0 {
        out.history.push(format!(
            "Extra units found: {} - {} over expected",
            item.name, -shortfall
        ));
    }
}

/// Freezes the current quantities as the new baseline.
pub fn rebase(items: &mut [Product]) {
    for item in items {
        item.original_quantity = Some(item.quantity);
    }
}
