use super::config::{ConfigError, SystemConfig};
use super::notifications::{NotificationFeed, Notifier};
use crate::clients::{OrderClient, StaffClient};
use crate::model::{Actor, OrderNotification, StaffCreate};
use crate::order_actor::OrderContext;
use crate::staff_actor::StaffError;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Staff(#[from] StaffError),

    #[error("Actor task failed: {0}")]
    ActorTask(String),
}

/// Starts, wires and stops the actors behind the order workflow.
///
/// Two actors run, each in its own task:
/// - **Order actor**: every order, with the workflow settings and the
///   notifier injected as context.
/// - **Staff actor**: the roster, no dependencies.
///
/// # Example
///
/// ```ignore
/// let system = OrderSystem::with_default_staff(SystemConfig::from_env()?).await?;
/// let vale = system.staff_client.identify(StaffId(1)).await?;
/// let id = system.order_client.create_order(create).await?;
/// system.shutdown().await?;
/// ```
pub struct OrderSystem {
    pub order_client: OrderClient,
    pub staff_client: StaffClient,
    notifier: Notifier,
    config: SystemConfig,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl OrderSystem {
    /// Spawns both actors. Must be called inside a Tokio runtime.
    pub fn new(config: SystemConfig) -> Self {
        let notifier = Notifier::new(config.notification_capacity);

        // 1. Create actors
        let (order_actor, order_client) = crate::order_actor::new(config.channel_capacity);
        let (staff_actor, staff_client) = crate::staff_actor::new(config.channel_capacity);

        // 2. Start actors with injected context
        let context = OrderContext::new(config.workflow_settings(), notifier.clone());
        let order_handle = tokio::spawn(order_actor.run(context));
        let staff_handle = tokio::spawn(staff_actor.run(()));

        info!(
            channel_capacity = config.channel_capacity,
            lock_lease_secs = config.lock_lease.map(|l| l.num_seconds()),
            "Order system started"
        );

        Self {
            order_client,
            staff_client,
            notifier,
            config,
            handles: vec![order_handle, staff_handle],
        }
    }

    /// Like [`new`](Self::new), with the shop's usual roster already created:
    /// Vale (coordinator), then Lucho, Franco and Negro (fulfillment).
    pub async fn with_default_staff(config: SystemConfig) -> Result<Self, SystemError> {
        let system = Self::new(config);
        for member in StaffCreate::default_roster() {
            system.staff_client.create_staff(member).await?;
        }
        Ok(system)
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Every notification, including those caused by the subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<OrderNotification> {
        self.notifier.subscribe()
    }

    /// Notifications caused by anyone but `actor`.
    pub fn feed_for(&self, actor: &Actor) -> NotificationFeed {
        self.notifier.feed_for(actor.name.as_str())
    }

    /// Drops the clients, which closes each actor's mailbox, then waits for
    /// every actor task to finish.
    ///
    /// Clones of the clients held elsewhere keep their actor alive, so drop
    /// them first.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");

        drop(self.order_client);
        drop(self.staff_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(SystemError::ActorTask(e.to_string()));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
