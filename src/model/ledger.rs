use super::product::{Product, ProductId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outstanding shortfall for one product. At most one per product; an entry
/// that would drop to zero is removed instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingEntry {
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub quantity: f64,
}

impl MissingEntry {
    pub fn for_product(product: &Product, quantity: f64) -> Self {
        Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            code: product.code.clone(),
            quantity,
        }
    }
}

/// Units the customer sent back at delivery. Entries accumulate and are never
/// merged, so one product may appear more than once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnedEntry {
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub quantity: f64,
    pub reason: String,
}

impl ReturnedEntry {
    pub fn for_product(product: &Product, quantity: f64, reason: impl Into<String>) -> Self {
        Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            code: product.code.clone(),
            quantity,
            reason: reason.into(),
        }
    }
}

/// One line of the audit trail. Never edited once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub action: String,
    pub user: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl HistoryEntry {
    pub fn new(action: impl Into<String>, user: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            action: action.into(),
            user: user.into(),
            timestamp,
            note: None,
        }
    }

    /// Attaches a note; blank notes are dropped.
    pub fn with_note(mut self, note: Option<&str>) -> Self {
        self.note = note
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        self
    }
}

/// The single "who is editing this order" claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkLock {
    pub holder: String,
    pub since: DateTime<Utc>,
}

impl WorkLock {
    pub fn new(holder: impl Into<String>, since: DateTime<Utc>) -> Self {
        Self {
            holder: holder.into(),
            since,
        }
    }

    /// How long the claim has been held, clamped at zero for clock skew.
    pub fn held_for(&self, now: DateTime<Utc>) -> chrono::Duration {
        (now - self.since).max(chrono::Duration::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn held_for_measures_elapsed_time() {
        let since = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let lock = WorkLock::new("Lucho", since);
        assert_eq!(lock.held_for(since + Duration::minutes(12)), Duration::minutes(12));
        assert_eq!(lock.held_for(since - Duration::minutes(1)), Duration::zero());
    }

    #[test]
    fn blank_notes_are_dropped() {
        let now = Utc::now();
        assert_eq!(HistoryEntry::new("x", "Vale", now).with_note(Some("  ")).note, None);
        assert_eq!(
            HistoryEntry::new("x", "Vale", now).with_note(Some(" fragile ")).note.as_deref(),
            Some("fragile")
        );
    }
}
