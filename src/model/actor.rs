use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Creates orders, edits budgets and invoices, verifies transfers.
    /// Never blocked by a work lock.
    Coordinator,
    /// Picks, controls, ships, delivers and collects payment.
    Fulfillment,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Coordinator => f.write_str("coordinator"),
            Role::Fulfillment => f.write_str("fulfillment"),
        }
    }
}

/// The identity attached to every call. Supplied by the caller, never persisted
/// beyond the names written into history, locks and assignments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }

    /// Shorthand used by tests and the demo: the name doubles as id.
    pub fn coordinator(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name, Role::Coordinator)
    }

    pub fn fulfillment(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name, Role::Fulfillment)
    }

    pub fn is_coordinator(&self) -> bool {
        self.role == Role::Coordinator
    }
}
