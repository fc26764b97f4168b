use super::order::{Order, OrderId};
use super::status::OrderStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Created,
    Transitioned,
}

/// Change event published after an order is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotification {
    pub order_id: OrderId,
    pub actor_name: String,
    pub new_status: OrderStatus,
    pub client_name: String,
    pub kind: NotificationKind,
}

impl OrderNotification {
    pub fn for_order(order: &Order, actor_name: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            order_id: order.id(),
            actor_name: actor_name.into(),
            new_status: order.status(),
            client_name: order.client_name().to_string(),
            kind,
        }
    }
}
