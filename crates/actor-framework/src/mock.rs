//! # Mock Clients for Tests
//!
//! Two ways to test code that talks to an actor without spawning the actor:
//!
//! * [`MockClient`]: queue expectations up front (`expect_get(id).return_ok(..)`),
//!   hand out [`MockClient::client`], then [`MockClient::verify`] that the queue
//!   was drained. Requests must arrive in the queued order and for the queued ids.
//! * [`create_mock_client`]: a bare client plus the receiving end of its mailbox.
//!   Pull requests off with [`expect_create`], [`expect_get`], [`expect_action`]
//!   and answer them by hand. Useful when the test needs to inspect the payload.
//!
//! | | MockClient | Real actor |
//! |---|---|---|
//! | State | none, canned replies | real store |
//! | Error injection | `return_err` | needs a real failing state |
//! | Use for | logic around a client | the entity itself, end-to-end flows |
//!
//! ```rust
//! use actor_framework::mock::MockClient;
//! use actor_framework::{ActorEntity, FrameworkError};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)] struct Ticket { id: u32 }
//! #[derive(Debug)] struct TicketCreate;
//! #[derive(Debug)] enum TicketAction {}
//! #[derive(Debug, thiserror::Error)] #[error("ticket error")] struct TicketError;
//!
//! #[async_trait]
//! impl ActorEntity for Ticket {
//!     type Id = u32; type Create = TicketCreate; type Action = TicketAction;
//!     type ActionResult = (); type Context = (); type Error = TicketError;
//!     fn from_create_params(id: u32, _: TicketCreate) -> Result<Self, Self::Error> { Ok(Self { id }) }
//!     async fn handle_action(&mut self, a: TicketAction, _: &()) -> Result<(), Self::Error> { match a {} }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<Ticket>::new();
//!     mock.expect_get(1).return_err(FrameworkError::ActorClosed);
//!
//!     let result = mock.client().get(1).await;
//!     assert!(matches!(result, Err(FrameworkError::ActorClosed)));
//!     mock.verify();
//! }
//! ```

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, oneshot};

enum Expectation<T: ActorEntity> {
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
    Create {
        response: Result<T::Id, FrameworkError>,
    },
    List {
        response: Result<Vec<T>, FrameworkError>,
    },
    Delete {
        id: T::Id,
        response: Result<(), FrameworkError>,
    },
    Action {
        id: T::Id,
        response: Result<T::ActionResult, FrameworkError>,
    },
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

fn lock_queue<T: ActorEntity>(queue: &Queue<T>) -> MutexGuard<'_, VecDeque<Expectation<T>>> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A mock client with an ordered expectation queue.
///
/// A request that does not match the head of the queue (wrong kind or wrong
/// id) panics the mock's responder task, which the caller observes as
/// [`FrameworkError::ActorDropped`]; `verify` then reports the leftovers.
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Queue<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = lock_queue(&queue).pop_front();
                respond(request, expectation);
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    pub fn expect_get(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        self.builder(move |response| Expectation::Get { id, response })
    }

    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T::Id> {
        self.builder(|response| Expectation::Create { response })
    }

    pub fn expect_list(&mut self) -> ExpectationBuilder<T, Vec<T>> {
        self.builder(|response| Expectation::List { response })
    }

    pub fn expect_delete(&mut self, id: T::Id) -> ExpectationBuilder<T, ()> {
        self.builder(move |response| Expectation::Delete { id, response })
    }

    pub fn expect_action(&mut self, id: T::Id) -> ExpectationBuilder<T, T::ActionResult> {
        self.builder(move |response| Expectation::Action { id, response })
    }

    /// Panics if any queued expectation was never consumed.
    pub fn verify(&self) {
        let remaining = lock_queue(&self.expectations).len();
        if remaining != 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }

    fn builder<R>(
        &self,
        make: impl FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send + 'static,
    ) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            make: Box::new(make),
            expectations: self.expectations.clone(),
        }
    }
}

fn respond<T: ActorEntity>(request: ResourceRequest<T>, expectation: Option<Expectation<T>>) {
    match (request, expectation) {
        (ResourceRequest::Get { id, respond_to }, Some(Expectation::Get { id: want, response })) => {
            assert_eq!(id, want, "get called with unexpected id");
            let _ = respond_to.send(response);
        }
        (ResourceRequest::Create { respond_to, .. }, Some(Expectation::Create { response })) => {
            let _ = respond_to.send(response);
        }
        (ResourceRequest::List { respond_to }, Some(Expectation::List { response })) => {
            let _ = respond_to.send(response);
        }
        (
            ResourceRequest::Delete { id, respond_to },
            Some(Expectation::Delete { id: want, response }),
        ) => {
            assert_eq!(id, want, "delete called with unexpected id");
            let _ = respond_to.send(response);
        }
        (
            ResourceRequest::Action { id, respond_to, .. },
            Some(Expectation::Action { id: want, response }),
        ) => {
            assert_eq!(id, want, "action called with unexpected id");
            let _ = respond_to.send(response);
        }
        (request, None) => panic!("Unexpected request with no expectation left: {request:?}"),
        (request, Some(_)) => panic!("Request does not match the next expectation: {request:?}"),
    }
}

/// Completes a queued expectation with its canned reply.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    make: Box<dyn FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send>,
    expectations: Queue<T>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    pub fn return_err(self, error: FrameworkError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, FrameworkError>) {
        let expectation = (self.make)(response);
        lock_queue(&self.expectations).push_back(expectation);
    }
}

/// Creates a client and the receiving end of its mailbox.
///
/// The test plays the actor: pull each request off `receiver`, assert on it and
/// answer through its responder.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Next message, if it is a Create request.
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Create, oneshot::Sender<Result<T::Id, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Next message, if it is a Get request.
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, oneshot::Sender<Result<Option<T>, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Next message, if it is a List request.
pub async fn expect_list<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<oneshot::Sender<Result<Vec<T>, FrameworkError>>> {
    match receiver.recv().await {
        Some(ResourceRequest::List { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Next message, if it is an Action request.
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Id,
    T::Action,
    oneshot::Sender<Result<T::ActionResult, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Clone, Debug, PartialEq)]
    struct Shift {
        id: u32,
        worker: String,
    }

    #[derive(Debug)]
    struct ShiftCreate {
        worker: String,
    }

    #[derive(Debug)]
    enum ShiftAction {
        Close,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("shift error")]
    struct ShiftError;

    #[async_trait]
    impl ActorEntity for Shift {
        type Id = u32;
        type Create = ShiftCreate;
        type Action = ShiftAction;
        type ActionResult = bool;
        type Context = ();
        type Error = ShiftError;

        fn from_create_params(id: u32, params: ShiftCreate) -> Result<Self, Self::Error> {
            Ok(Self {
                id,
                worker: params.worker,
            })
        }

        async fn handle_action(&mut self, _: ShiftAction, _: &()) -> Result<bool, Self::Error> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_raw_mock_client_create() {
        let (client, mut receiver) = create_mock_client::<Shift>(10);

        let task = tokio::spawn(async move {
            client
                .create(ShiftCreate {
                    worker: "Lucho".into(),
                })
                .await
        });

        let (payload, responder) = expect_create(&mut receiver)
            .await
            .expect("Expected Create request");
        assert_eq!(payload.worker, "Lucho");
        responder.send(Ok(7)).unwrap();

        assert_eq!(task.await.unwrap().unwrap(), 7);
    }

    #[tokio::test]
    async fn test_raw_mock_client_action() {
        let (client, mut receiver) = create_mock_client::<Shift>(10);

        let task = tokio::spawn(async move { client.perform_action(3, ShiftAction::Close).await });

        let (id, action, responder) = expect_action(&mut receiver).await.unwrap();
        assert_eq!(id, 3);
        assert!(matches!(action, ShiftAction::Close));
        responder.send(Ok(false)).unwrap();

        assert!(!task.await.unwrap().unwrap());
    }

    #[tokio::test]
    async fn test_mock_client_with_expectations() {
        let mut mock = MockClient::<Shift>::new();
        mock.expect_create().return_ok(1);
        mock.expect_get(1).return_ok(Some(Shift {
            id: 1,
            worker: "Franco".into(),
        }));
        mock.expect_list().return_ok(vec![]);
        mock.expect_action(1).return_ok(true);
        mock.expect_delete(1).return_err(FrameworkError::NotFound("1".into()));

        let client = mock.client();
        let id = client
            .create(ShiftCreate {
                worker: "Franco".into(),
            })
            .await
            .unwrap();
        assert_eq!(id, 1);
        assert_eq!(client.get(1).await.unwrap().unwrap().worker, "Franco");
        assert!(client.list().await.unwrap().is_empty());
        assert!(client.perform_action(1, ShiftAction::Close).await.unwrap());
        assert!(matches!(
            client.delete(1).await,
            Err(FrameworkError::NotFound(_))
        ));

        mock.verify();
    }

    #[tokio::test]
    async fn test_mock_client_rejects_wrong_id() {
        let mut mock = MockClient::<Shift>::new();
        mock.expect_get(1).return_ok(None);

        let result = mock.client().get(2).await;
        assert!(matches!(result, Err(FrameworkError::ActorDropped)));
    }

    #[tokio::test]
    #[should_panic(expected = "Not all expectations were met")]
    async fn test_verify_reports_unused_expectations() {
        let mut mock = MockClient::<Shift>::new();
        mock.expect_get(1).return_ok(None);
        mock.verify();
    }
}
