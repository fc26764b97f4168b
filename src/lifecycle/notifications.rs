//! Change notifications.
//!
//! The order actor publishes an [`OrderNotification`] after every committed
//! creation or transition. Delivery is best effort: with no subscribers the
//! event is dropped, and a subscriber that falls behind skips what it missed.

use crate::model::OrderNotification;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, warn};

/// Sending side, cloned into the order actor's context.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<OrderNotification>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, notification: OrderNotification) {
        let order_id = notification.order_id;
        match self.sender.send(notification) {
            Ok(receivers) => debug!(%order_id, receivers, "Notification published"),
            Err(_) => debug!(%order_id, "No subscribers"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderNotification> {
        self.sender.subscribe()
    }

    /// A feed that leaves out events caused by `actor_name`.
    pub fn feed_for(&self, actor_name: impl Into<String>) -> NotificationFeed {
        NotificationFeed {
            receiver: self.subscribe(),
            actor_name: actor_name.into(),
        }
    }
}

/// One staff member's view of the notification stream.
#[derive(Debug)]
pub struct NotificationFeed {
    receiver: broadcast::Receiver<OrderNotification>,
    actor_name: String,
}

impl NotificationFeed {
    /// Waits for the next event from someone else. `None` once the system has
    /// shut down.
    pub async fn recv(&mut self) -> Option<OrderNotification> {
        loop {
            match self.receiver.recv().await {
                Ok(n) if n.actor_name == self.actor_name => continue,
                Ok(n) => return Some(n),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(actor = %self.actor_name, skipped, "Notification feed lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// The next pending event from someone else, without waiting.
    pub fn try_recv(&mut self) -> Option<OrderNotification> {
        loop {
            match self.receiver.try_recv() {
                Ok(n) if n.actor_name == self.actor_name => continue,
                Ok(n) => return Some(n),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(actor = %self.actor_name, skipped, "Notification feed lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}
