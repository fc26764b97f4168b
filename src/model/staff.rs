use super::actor::{Actor, Role};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StaffId(pub u32);

impl From<u32> for StaffId {
    fn from(n: u32) -> Self {
        Self(n)
    }
}

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "staff_{}", self.0)
    }
}

/// A person who can act on orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: StaffId,
    pub name: String,
    pub role: Role,
}

impl StaffMember {
    /// The identity passed to order operations.
    pub fn as_actor(&self) -> Actor {
        Actor::new(self.id.to_string(), self.name.clone(), self.role)
    }
}

#[derive(Debug, Clone)]
pub struct StaffCreate {
    pub name: String,
    pub role: Role,
}

impl StaffCreate {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }

    /// The roster the shop started with.
    pub fn default_roster() -> Vec<StaffCreate> {
        vec![
            StaffCreate::new("Vale", Role::Coordinator),
            StaffCreate::new("Lucho", Role::Fulfillment),
            StaffCreate::new("Franco", Role::Fulfillment),
            StaffCreate::new("Negro", Role::Fulfillment),
        ]
    }
}
