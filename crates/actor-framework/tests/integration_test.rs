use actor_framework::{ActorEntity, FrameworkError, ResourceActor};
use async_trait::async_trait;

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq)]
struct Bin {
    id: u32,
    label: String,
    units: u32,
}

#[derive(Debug)]
struct BinCreate {
    label: String,
    units: u32,
}

#[derive(Debug)]
enum BinAction {
    Take(u32),
    Relabel(String),
}

#[derive(Debug, thiserror::Error, PartialEq)]
enum BinError {
    #[error("label must not be blank")]
    BlankLabel,
    #[error("only {available} units left")]
    Short { available: u32 },
}

#[async_trait]
impl ActorEntity for Bin {
    type Id = u32;
    type Create = BinCreate;
    type Action = BinAction;
    type ActionResult = u32;
    type Context = ();
    type Error = BinError;

    fn from_create_params(id: u32, params: BinCreate) -> Result<Self, Self::Error> {
        if params.label.trim().is_empty() {
            return Err(BinError::BlankLabel);
        }
        Ok(Self {
            id,
            label: params.label,
            units: params.units,
        })
    }

    async fn handle_action(&mut self, action: BinAction, _ctx: &()) -> Result<u32, Self::Error> {
        match action {
            BinAction::Take(n) => {
                // Relabel first so a rejected take proves staging discards edits.
                self.label = format!("{} (touched)", self.label);
                if n > self.units {
                    return Err(BinError::Short {
                        available: self.units,
                    });
                }
                self.units -= n;
                Ok(self.units)
            }
            BinAction::Relabel(label) => {
                self.label = label;
                Ok(self.units)
            }
        }
    }
}

fn bin(label: &str, units: u32) -> BinCreate {
    BinCreate {
        label: label.into(),
        units,
    }
}

#[tokio::test]
async fn test_framework_full_lifecycle() {
    let (actor, client) = ResourceActor::new(10);
    let handle = tokio::spawn(actor.run(()));

    let id: u32 = client.create(bin("shelf A", 10)).await.unwrap();
    assert_eq!(id, 1);

    let left = client.perform_action(id, BinAction::Take(4)).await.unwrap();
    assert_eq!(left, 6);

    client
        .perform_action(id, BinAction::Relabel("shelf B".into()))
        .await
        .unwrap();
    let stored: Bin = client.get(id).await.unwrap().unwrap();
    assert_eq!(stored.label, "shelf B");
    assert_eq!(stored.units, 6);

    client.delete(id).await.unwrap();
    assert!(client.get(id).await.unwrap().is_none());

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_failed_action_leaves_entity_untouched() {
    let (actor, client) = ResourceActor::<Bin>::new(10);
    tokio::spawn(actor.run(()));

    let id = client.create(bin("shelf A", 3)).await.unwrap();
    let before = client.get(id).await.unwrap().unwrap();

    let err = client
        .perform_action(id, BinAction::Take(5))
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_entity::<BinError>().unwrap(),
        BinError::Short { available: 3 }
    );

    let after = client.get(id).await.unwrap().unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_create_error_is_typed_and_not_stored() {
    let (actor, client) = ResourceActor::<Bin>::new(10);
    tokio::spawn(actor.run(()));

    let err = client.create(bin("   ", 1)).await.unwrap_err();
    assert_eq!(err.downcast_entity::<BinError>().unwrap(), BinError::BlankLabel);
    assert!(client.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_returns_entities_in_id_order() {
    let (actor, client) = ResourceActor::<Bin>::new(10);
    tokio::spawn(actor.run(()));

    for label in ["a", "b", "c"] {
        client.create(bin(label, 1)).await.unwrap();
    }
    let labels: Vec<String> = client
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.label)
        .collect();
    assert_eq!(labels, ["a", "b", "c"]);
}

#[tokio::test]
async fn test_missing_entity_reports_not_found() {
    let (actor, client) = ResourceActor::<Bin>::new(10);
    tokio::spawn(actor.run(()));

    assert!(matches!(
        client.perform_action(42, BinAction::Take(1)).await,
        Err(FrameworkError::NotFound(id)) if id == "42"
    ));
    assert!(matches!(
        client.delete(42).await,
        Err(FrameworkError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_closed_actor_reports_actor_closed() {
    let (actor, client) = ResourceActor::<Bin>::new(10);
    drop(actor);

    assert!(matches!(
        client.get(1).await,
        Err(FrameworkError::ActorClosed)
    ));
}
