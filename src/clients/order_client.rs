//! # Order Client
//!
//! Typed API over `ResourceClient<Order>`. Entity errors are unboxed back into
//! [`OrderError`] so callers can match on `Forbidden`, `Locked`, `InvalidInput`
//! and `NotFound` directly.
use crate::model::{Actor, Order, OrderCreate, OrderFilter, OrderId, Product, WorkLock};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError};
use crate::workflow::{NextAction, TransitionRequest};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use std::cmp::Reverse;
use tracing::{debug, instrument};

/// Client for interacting with the Order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, create), fields(client = %create.client_name))]
    pub async fn create_order(&self, create: OrderCreate) -> Result<OrderId, OrderError> {
        debug!(?create, "create_order called");
        self.inner.create(create).await.map_err(Self::map_error)
    }

    /// Like [`ActorClient::get`] but an absent order is an error.
    #[instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.get(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    /// Orders matching `filter`, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, OrderError> {
        let mut orders: Vec<Order> = self
            .list()
            .await?
            .into_iter()
            .filter(|order| order.matches(filter))
            .collect();
        orders.sort_by_key(|order| Reverse((order.created_at(), order.id())));
        Ok(orders)
    }

    #[instrument(skip(self, actor), fields(actor = %actor.name))]
    pub async fn acquire_lock(
        &self,
        id: OrderId,
        actor: &Actor,
    ) -> Result<Option<WorkLock>, OrderError> {
        let action = OrderAction::AcquireLock {
            actor: actor.clone(),
        };
        match self.act(id, action).await? {
            OrderActionResult::AcquireLock(lock) => Ok(lock),
            other => Err(unexpected(other)),
        }
    }

    /// Clears the claim if `actor` holds it; `None` clears any claim.
    #[instrument(skip(self))]
    pub async fn release_lock(&self, id: OrderId, actor: Option<&Actor>) -> Result<bool, OrderError> {
        let action = OrderAction::ReleaseLock {
            actor: actor.cloned(),
        };
        match self.act(id, action).await? {
            OrderActionResult::ReleaseLock(released) => Ok(released),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn query_lock(&self, id: OrderId) -> Result<Option<WorkLock>, OrderError> {
        match self.act(id, OrderAction::QueryLock).await? {
            OrderActionResult::QueryLock(lock) => Ok(lock),
            other => Err(unexpected(other)),
        }
    }

    /// Applies one transition and returns the committed order.
    #[instrument(skip(self, request), fields(transition = ?request.transition, actor = %request.actor.name))]
    pub async fn apply_transition(
        &self,
        id: OrderId,
        request: TransitionRequest,
    ) -> Result<Order, OrderError> {
        debug!(?request, "apply_transition called");
        match self.act(id, OrderAction::Transition(request)).await? {
            OrderActionResult::Transition(order) => Ok(*order),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self, actor, working), fields(actor = %actor.name))]
    pub async fn next_actions(
        &self,
        id: OrderId,
        actor: &Actor,
        working: Option<Vec<Product>>,
    ) -> Result<Vec<NextAction>, OrderError> {
        let action = OrderAction::NextActions {
            actor: actor.clone(),
            working,
        };
        match self.act(id, action).await? {
            OrderActionResult::NextActions(actions) => Ok(actions),
            other => Err(unexpected(other)),
        }
    }

    async fn act(&self, id: OrderId, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }
}

fn unexpected(result: OrderActionResult) -> OrderError {
    OrderError::ActorCommunicationError(format!("unexpected reply: {result:?}"))
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.downcast_entity::<OrderError>() {
            Ok(order_error) => order_error,
            Err(FrameworkError::NotFound(id)) => OrderError::NotFound(id),
            Err(other) => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OrderScope, ProductDraft};
    use actor_framework::mock::{create_mock_client, expect_action, expect_create, MockClient};
    use chrono::{DateTime, Utc};

    fn order_at(id: u32, client: &str, secs: i64) -> Order {
        let create = OrderCreate::new(client, Actor::coordinator("Vale"))
            .product(ProductDraft::new("Yerba", 1.0));
        let at = DateTime::<Utc>::from_timestamp(secs, 0).unwrap();
        Order::open(OrderId(id), create, at).unwrap()
    }

    #[tokio::test]
    async fn create_order_forwards_payload() {
        let (inner, mut receiver) = create_mock_client::<Order>(4);
        let client = OrderClient::new(inner);

        let task = tokio::spawn(async move {
            let create = OrderCreate::new("Almacen Sur", Actor::coordinator("Vale"))
                .product(ProductDraft::new("Yerba", 3.0));
            client.create_order(create).await
        });

        let (params, responder) = expect_create(&mut receiver).await.unwrap();
        assert_eq!(params.client_name, "Almacen Sur");
        assert_eq!(params.products.len(), 1);
        responder.send(Ok(OrderId(5))).unwrap();

        assert_eq!(task.await.unwrap().unwrap(), OrderId(5));
    }

    #[tokio::test]
    async fn entity_errors_come_back_typed() {
        let (inner, mut receiver) = create_mock_client::<Order>(4);
        let client = OrderClient::new(inner);
        let lucho = Actor::fulfillment("Lucho");

        let task = tokio::spawn(async move { client.acquire_lock(OrderId(1), &lucho).await });

        let (id, action, responder) = expect_action(&mut receiver).await.unwrap();
        assert_eq!(id, OrderId(1));
        assert!(matches!(action, OrderAction::AcquireLock { ref actor } if actor.name == "Lucho"));
        responder
            .send(Err(FrameworkError::EntityError(Box::new(OrderError::Locked {
                holder: "Franco".into(),
            }))))
            .unwrap();

        assert_eq!(
            task.await.unwrap(),
            Err(OrderError::Locked {
                holder: "Franco".into()
            })
        );
    }

    #[tokio::test]
    async fn missing_order_maps_to_not_found() {
        let mut mock = MockClient::<Order>::new();
        mock.expect_get(OrderId(9)).return_ok(None);
        mock.expect_action(OrderId(9))
            .return_err(FrameworkError::NotFound("order_9".into()));

        let client = OrderClient::new(mock.client());
        assert!(matches!(
            client.get_order(OrderId(9)).await,
            Err(OrderError::NotFound(_))
        ));
        assert!(matches!(
            client.query_lock(OrderId(9)).await,
            Err(OrderError::NotFound(_))
        ));
        mock.verify();
    }

    #[tokio::test]
    async fn closed_actor_is_a_communication_error() {
        let mut mock = MockClient::<Order>::new();
        mock.expect_list().return_err(FrameworkError::ActorClosed);

        let client = OrderClient::new(mock.client());
        let err = client.list_orders(&OrderFilter::default()).await.unwrap_err();
        assert!(matches!(err, OrderError::ActorCommunicationError(_)));
        assert!(err.is_retryable());
        mock.verify();
    }

    #[tokio::test]
    async fn list_orders_filters_and_sorts_newest_first() {
        let mut mock = MockClient::<Order>::new();
        let mut paid = order_at(3, "Kiosco Mitre", 300);
        paid.status = crate::model::OrderStatus::Pagado;
        mock.expect_list().return_ok(vec![
            order_at(1, "Almacen Sur", 100),
            order_at(2, "Despensa Norte", 200),
            paid.clone(),
        ]);
        mock.expect_list()
            .return_ok(vec![order_at(1, "Almacen Sur", 100), paid]);

        let client = OrderClient::new(mock.client());

        let active = client.list_orders(&OrderFilter::active()).await.unwrap();
        let ids: Vec<u32> = active.iter().map(|o| o.id().0).collect();
        assert_eq!(ids, [2, 1]);

        let filter = OrderFilter {
            scope: OrderScope::Completed,
            search: Some("MITRE".into()),
        };
        let completed = client.list_orders(&filter).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id(), OrderId(3));
        mock.verify();
    }

    #[tokio::test]
    async fn mismatched_reply_is_reported() {
        let mut mock = MockClient::<Order>::new();
        mock.expect_action(OrderId(1))
            .return_ok(OrderActionResult::ReleaseLock(true));

        let client = OrderClient::new(mock.client());
        assert!(matches!(
            client.query_lock(OrderId(1)).await,
            Err(OrderError::ActorCommunicationError(_))
        ));
        mock.verify();
    }
}
