//! # Generic Actor Server
//!
//! `ResourceActor` owns the store for one entity type and drains its mailbox one
//! request at a time. Because a single task owns the store, two requests for the
//! same entity can never interleave; callers get per-entity serialization for
//! free and the store needs no `Mutex`.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that manages a collection of entities.
///
/// Create it with [`ResourceActor::new`], hand the returned [`ResourceClient`]
/// to whoever needs it, then spawn [`ResourceActor::run`] with the entity's
/// context. The loop exits once every client has been dropped.
///
/// ```rust
/// use actor_framework::{ActorEntity, ResourceActor};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Counter { id: u32, hits: u32 }
/// #[derive(Debug)] struct CounterCreate;
/// #[derive(Debug)] enum CounterAction { Hit }
/// #[derive(Debug, thiserror::Error)] #[error("counter error")] struct CounterError;
///
/// #[async_trait]
/// impl ActorEntity for Counter {
///     type Id = u32;
///     type Create = CounterCreate;
///     type Action = CounterAction;
///     type ActionResult = u32;
///     type Context = ();
///     type Error = CounterError;
///
///     fn from_create_params(id: u32, _: CounterCreate) -> Result<Self, Self::Error> {
///         Ok(Self { id, hits: 0 })
///     }
///     async fn handle_action(&mut self, _: CounterAction, _: &()) -> Result<u32, Self::Error> {
///         self.hits += 1;
///         Ok(self.hits)
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = ResourceActor::<Counter>::new(10);
///     tokio::spawn(actor.run(()));
///
///     let id = client.create(CounterCreate).await.unwrap();
///     assert_eq!(client.perform_action(id, CounterAction::Hit).await.unwrap(), 1);
/// }
/// ```
///
/// ## Operations
///
/// * **Create**: takes the next id from the counter, builds the entity with
///   `from_create_params`, runs `on_create`, then stores it.
/// * **Get** / **List**: return clones; the caller never sees the live value.
/// * **Delete**: runs `on_delete`, then removes the entity.
/// * **Action**: clones the stored entity, runs `handle_action` on the clone and
///   swaps it in only on success. A failed action leaves the stored entity
///   exactly as it was.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: BTreeMap<T::Id, T>,
    next_id: u32,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// `buffer_size` is the mailbox capacity; senders wait when it is full.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: BTreeMap::new(),
            next_id: 1,
        };
        (actor, ResourceClient::new(sender))
    }

    /// Runs the event loop until every client is gone.
    ///
    /// The context is bound here rather than in `new`, so actors that need each
    /// other's clients can all be constructed before any of them starts.
    pub async fn run(mut self, context: T::Context) {
        let entity_type = std::any::type_name::<T>()
            .rsplit("::")
            .next()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let result = self.create(params, &context).await;
                    match &result {
                        Ok(id) => info!(entity_type, %id, size = self.store.len(), "Created"),
                        Err(e) => warn!(entity_type, error = %e, "Create failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    debug!(entity_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { respond_to } => {
                    debug!(entity_type, size = self.store.len(), "List");
                    let _ = respond_to.send(Ok(self.store.values().cloned().collect()));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    let result = self.delete(&id, &context).await;
                    match &result {
                        Ok(()) => info!(entity_type, %id, size = self.store.len(), "Deleted"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Delete failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let result = self.act(&id, action, &context).await;
                    match &result {
                        Ok(_) => info!(entity_type, %id, "Action ok"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Action failed"),
                    }
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }

    async fn create(
        &mut self,
        params: T::Create,
        context: &T::Context,
    ) -> Result<T::Id, FrameworkError> {
        let id = T::Id::from(self.next_id);
        self.next_id += 1;

        let mut item = T::from_create_params(id.clone(), params).map_err(entity_error)?;
        item.on_create(context).await.map_err(entity_error)?;
        self.store.insert(id.clone(), item);
        Ok(id)
    }

    async fn delete(&mut self, id: &T::Id, context: &T::Context) -> Result<(), FrameworkError> {
        let item = self
            .store
            .get(id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        item.on_delete(context).await.map_err(entity_error)?;
        self.store.remove(id);
        Ok(())
    }

    async fn act(
        &mut self,
        id: &T::Id,
        action: T::Action,
        context: &T::Context,
    ) -> Result<T::ActionResult, FrameworkError> {
        let mut staged = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        let result = staged
            .handle_action(action, context)
            .await
            .map_err(entity_error)?;
        self.store.insert(id.clone(), staged);
        Ok(result)
    }
}

fn entity_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> FrameworkError {
    FrameworkError::EntityError(Box::new(e))
}
