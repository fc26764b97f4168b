use serde::{Deserialize, Serialize};
use std::fmt;

/// Line item identifier, unique within its order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A line item.
///
/// `original_quantity` is the baseline frozen at creation or at the last budget
/// or invoice edit; `original_quantity - quantity` is the shortfall. Items
/// without a baseline take no part in ledger reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub name: String,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_quantity: Option<f64>,
    /// Pass-scoped tick on a working copy. Committed items always carry `false`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub checked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Product {
    /// A baselined item: `original_quantity == quantity`.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, quantity: f64) -> Self {
        Self {
            id: id.into(),
            code: None,
            name: name.into(),
            quantity,
            original_quantity: Some(quantity),
            checked: false,
            unit_price: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_unit_price(mut self, price: f64) -> Self {
        self.unit_price = Some(price);
        self
    }

    /// `original_quantity - quantity`, or `None` without a baseline.
    pub fn shortfall(&self) -> Option<f64> {
        self.original_quantity
            .map(|original| normalize_quantity(original - self.quantity))
    }

    pub fn subtotal(&self) -> Option<f64> {
        self.unit_price.map(|price| price * self.quantity)
    }
}

/// Input row for order creation, as produced by whatever parsed the customer's
/// list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub code: Option<String>,
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: Option<f64>,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, quantity: f64) -> Self {
        Self {
            id: None,
            code: None,
            name: name.into(),
            quantity,
            unit_price: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<ProductId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_unit_price(mut self, price: f64) -> Self {
        self.unit_price = Some(price);
        self
    }
}

/// Rounds away binary noise so `10.0 - 9.9` compares and prints as `0.1`.
pub(crate) fn normalize_quantity(q: f64) -> f64 {
    (q * 1_000_000.0).round() / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortfall_needs_a_baseline() {
        let mut item = Product::new("p1", "Yerba", 10.0);
        item.quantity = 7.5;
        assert_eq!(item.shortfall(), Some(2.5));

        item.original_quantity = None;
        assert_eq!(item.shortfall(), None);
    }

    #[test]
    fn shortfall_is_normalized() {
        let mut item = Product::new("p1", "Harina", 10.0);
        item.quantity = 9.9;
        assert_eq!(item.shortfall(), Some(0.1));
    }

    #[test]
    fn checked_is_only_serialized_when_set() {
        let mut item = Product::new("p1", "Aceite", 2.0);
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("checked").is_none());
        assert_eq!(json["originalQuantity"], 2.0);

        item.checked = true;
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["checked"], true);

        let read: Product =
            serde_json::from_str(r#"{"id":"p9","name":"Sal","quantity":1.0}"#).unwrap();
        assert!(!read.checked);
        assert_eq!(read.original_quantity, None);
    }

    #[test]
    fn subtotal_uses_unit_price() {
        let item = Product::new("p1", "Azucar", 3.0).with_unit_price(1.5);
        assert_eq!(item.subtotal(), Some(4.5));
        assert_eq!(Product::new("p2", "Te", 1.0).subtotal(), None);
    }
}
