use super::actor::Actor;
use super::ledger::{HistoryEntry, MissingEntry, ReturnedEntry, WorkLock};
use super::product::{Product, ProductDraft};
use super::status::{OrderStatus, PaymentMethod};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order identifier, assigned by the order actor and shown as `order_<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(n: u32) -> Self {
        Self(n)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("order_")
            .and_then(|n| n.parse().ok())
            .map(OrderId)
            .ok_or_else(|| format!("not an order id: {s}"))
    }
}

impl From<OrderId> for String {
    fn from(id: OrderId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for OrderId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// The order aggregate.
///
/// Fields are crate-private: outside code reads through the accessors and
/// changes an order only through the workflow operations, which return a new
/// value and leave `self` untouched on error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub(crate) id: OrderId,
    pub(crate) client_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) client_address: Option<String>,
    pub(crate) status: OrderStatus,
    pub(crate) products: Vec<Product>,
    #[serde(default)]
    pub(crate) missing_products: Vec<MissingEntry>,
    #[serde(default)]
    pub(crate) returned_products: Vec<ReturnedEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub(crate) paid: bool,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) history: Vec<HistoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) armed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) controlled_by: Option<String>,
    #[serde(default)]
    pub(crate) awaiting_transfer_verification: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) work_lock: Option<WorkLock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) initial_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) total: Option<f64>,
}

impl Order {
    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn client_address(&self) -> Option<&str> {
        self.client_address.as_deref()
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, id: &super::ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    pub fn missing_products(&self) -> &[MissingEntry] {
        &self.missing_products
    }

    pub fn returned_products(&self) -> &[ReturnedEntry] {
        &self.returned_products
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn is_paid(&self) -> bool {
        self.paid
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// The actor who completed picking.
    pub fn armed_by(&self) -> Option<&str> {
        self.armed_by.as_deref()
    }

    /// The actor who controlled the pick.
    pub fn controlled_by(&self) -> Option<&str> {
        self.controlled_by.as_deref()
    }

    pub fn is_awaiting_transfer_verification(&self) -> bool {
        self.awaiting_transfer_verification
    }

    /// The stored claim, live or expired. See [`Order::active_lock`].
    pub fn work_lock(&self) -> Option<&WorkLock> {
        self.work_lock.as_ref()
    }

    pub fn initial_notes(&self) -> Option<&str> {
        self.initial_notes.as_deref()
    }

    pub fn total(&self) -> Option<f64> {
        self.total
    }

    /// A fresh working copy of the items, every tick cleared.
    pub fn working_copy(&self) -> Vec<Product> {
        self.products
            .iter()
            .cloned()
            .map(|mut p| {
                p.checked = false;
                p
            })
            .collect()
    }

    /// Sum of subtotals when every item is priced, else the stored total.
    pub fn computed_total(&self) -> Option<f64> {
        self.products
            .iter()
            .map(Product::subtotal)
            .sum::<Option<f64>>()
            .or(self.total)
    }

    pub fn matches(&self, filter: &OrderFilter) -> bool {
        let in_scope = match filter.scope {
            OrderScope::All => true,
            OrderScope::Active => !self.status.is_terminal(),
            OrderScope::Completed => self.status.is_terminal(),
        };
        in_scope
            && filter
                .search
                .as_deref()
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .is_none_or(|term| {
                    let term = term.to_lowercase();
                    self.client_name.to_lowercase().contains(&term)
                        || self.id.to_string().contains(&term)
                })
    }

    /// One `code - name: qty` line per missing entry.
    pub fn missing_summary(&self) -> String {
        self.missing_products
            .iter()
            .map(|m| summary_line(m.code.as_deref(), &m.product_name, m.quantity))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Plain-text invoice: header, shipped items, then outstanding shortfalls.
    pub fn invoice_summary(&self) -> String {
        let mut lines = vec![
            format!("INVOICE SUMMARY - {}", self.client_name),
            format!("Date: {}", self.created_at.format("%d/%m/%Y")),
            "PRODUCTS:".to_string(),
        ];
        lines.extend(
            self.products
                .iter()
                .filter(|p| p.quantity > 0.0)
                .map(|p| summary_line(p.code.as_deref(), &p.name, p.quantity)),
        );
        if !self.missing_products.is_empty() {
            lines.push("MISSING:".to_string());
            lines.push(self.missing_summary());
        }
        lines.join("\n")
    }
}

fn summary_line(code: Option<&str>, name: &str, quantity: f64) -> String {
    match code {
        Some(code) => format!("{code} - {name}: {quantity}"),
        None => format!("{name}: {quantity}"),
    }
}

/// Payload for opening a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub client_name: String,
    pub client_address: Option<String>,
    pub initial_notes: Option<String>,
    pub total: Option<f64>,
    pub products: Vec<ProductDraft>,
    pub created_by: Actor,
}

impl OrderCreate {
    pub fn new(client_name: impl Into<String>, created_by: Actor) -> Self {
        Self {
            client_name: client_name.into(),
            client_address: None,
            initial_notes: None,
            total: None,
            products: Vec::new(),
            created_by,
        }
    }

    pub fn product(mut self, draft: ProductDraft) -> Self {
        self.products.push(draft);
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.client_address = Some(address.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.initial_notes = Some(notes.into());
        self
    }

    pub fn total(mut self, total: f64) -> Self {
        self.total = Some(total);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderScope {
    #[default]
    All,
    /// Everything not yet paid.
    Active,
    /// Paid orders.
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub scope: OrderScope,
    /// Case-insensitive match on client name or order id.
    pub search: Option<String>,
}

impl OrderFilter {
    pub fn active() -> Self {
        Self {
            scope: OrderScope::Active,
            search: None,
        }
    }

    pub fn completed() -> Self {
        Self {
            scope: OrderScope::Completed,
            search: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }
}
