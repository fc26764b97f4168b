//! [`ActorEntity`] implementation for [`Order`].
//!
//! The actor supplies the clock and the workflow settings; the workflow
//! functions do the rest. Successful creations and transitions are announced
//! on the notification channel.

use super::actions::{OrderAction, OrderActionResult};
use super::error::OrderError;
use crate::lifecycle::Notifier;
use crate::model::{NotificationKind, Order, OrderCreate, OrderId, OrderNotification};
use crate::workflow::WorkflowSettings;
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

/// Dependencies injected into the Order actor at `run()`.
#[derive(Debug, Clone)]
pub struct OrderContext {
    pub settings: WorkflowSettings,
    pub notifier: Notifier,
}

impl OrderContext {
    pub fn new(settings: WorkflowSettings, notifier: Notifier) -> Self {
        Self { settings, notifier }
    }
}

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Context = OrderContext;
    type Error = OrderError;

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        Order::open(id, params, Utc::now())
    }

    async fn on_create(&mut self, ctx: &OrderContext) -> Result<(), OrderError> {
        let creator = self
            .history()
            .first()
            .map(|h| h.user.clone())
            .unwrap_or_default();
        ctx.notifier.publish(OrderNotification::for_order(
            self,
            creator,
            NotificationKind::Created,
        ));
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        ctx: &OrderContext,
    ) -> Result<OrderActionResult, OrderError> {
        let now = Utc::now();
        let policy = &ctx.settings.lock;

        match action {
            OrderAction::AcquireLock { actor } => {
                self.acquire_lock(&actor, now, policy)?;
                Ok(OrderActionResult::AcquireLock(self.work_lock().cloned()))
            }
            OrderAction::ReleaseLock { actor } => {
                Ok(OrderActionResult::ReleaseLock(self.release_lock(actor.as_ref())))
            }
            OrderAction::QueryLock => Ok(OrderActionResult::QueryLock(
                self.active_lock(now, policy).cloned(),
            )),
            OrderAction::Transition(request) => {
                *self = self.apply_transition(&request, now, &ctx.settings)?;
                ctx.notifier.publish(OrderNotification::for_order(
                    self,
                    request.actor.name.as_str(),
                    NotificationKind::Transitioned,
                ));
                Ok(OrderActionResult::Transition(Box::new(self.clone())))
            }
            OrderAction::NextActions { actor, working } => {
                debug!(order_id = %self.id(), actor = %actor.name, "Resolving next actions");
                Ok(OrderActionResult::NextActions(self.next_actions(
                    &actor,
                    working.as_deref(),
                    now,
                    policy,
                )))
            }
        }
    }
}
