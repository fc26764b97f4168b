//! Opening orders and validating coordinator-supplied item lists.

use crate::model::{
    normalize_quantity, HistoryEntry, Order, OrderCreate, OrderId, OrderStatus, Product,
    ProductDraft, ProductId, Role,
};
use crate::order_actor::OrderError;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

impl Order {
    /// Builds a new order at `en_armado` from a coordinator's budget.
    pub fn open(id: OrderId, create: OrderCreate, now: DateTime<Utc>) -> Result<Order, OrderError> {
        if create.created_by.role != Role::Coordinator {
            return Err(OrderError::forbidden(format!(
                "{} cannot create orders",
                create.created_by.name
            )));
        }
        let client_name = create.client_name.trim();
        if client_name.is_empty() {
            return Err(OrderError::invalid("client name is required"));
        }

        let products = create
            .products
            .into_iter()
            .map(draft_to_product)
            .collect::<Vec<_>>();
        validate_items(&products)?;

        let initial_notes = trimmed(create.initial_notes);
        let created = HistoryEntry::new(
            "Budget created, order ready for picking",
            create.created_by.name.as_str(),
            now,
        )
        .with_note(initial_notes.as_deref());

        Ok(Order {
            id,
            client_name: client_name.to_string(),
            client_address: trimmed(create.client_address),
            status: OrderStatus::EnArmado,
            products,
            missing_products: Vec::new(),
            returned_products: Vec::new(),
            payment_method: None,
            paid: false,
            created_at: now,
            history: vec![created],
            armed_by: None,
            controlled_by: None,
            awaiting_transfer_verification: false,
            work_lock: None,
            initial_notes,
            total: create.total,
        })
    }
}

fn draft_to_product(draft: ProductDraft) -> Product {
    let quantity = normalize_quantity(draft.quantity);
    Product {
        id: draft.id.unwrap_or_else(ProductId::generate),
        code: trimmed(draft.code),
        name: draft.name.trim().to_string(),
        quantity,
        original_quantity: Some(quantity),
        checked: false,
        unit_price: draft.unit_price,
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A full item list as a coordinator writes it: at least one row, unique ids,
/// a name on every row and a positive finite quantity.
pub(crate) fn validate_items(items: &[Product]) -> Result<(), OrderError> {
    if items.is_empty() {
        return Err(OrderError::invalid("an order needs at least one product"));
    }
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(&item.id) {
            return Err(OrderError::invalid(format!("duplicate product id {}", item.id)));
        }
        if item.name.trim().is_empty() {
            return Err(OrderError::invalid(format!("product {} has no name", item.id)));
        }
        if !item.quantity.is_finite() || item.quantity <= 0.0 {
            return Err(OrderError::invalid(format!(
                "{} needs a positive quantity, got {}",
                item.name.trim(),
                item.quantity
            )));
        }
    }
    Ok(())
}
