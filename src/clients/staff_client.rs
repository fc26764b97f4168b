//! # Staff Client
//!
//! Roster lookups. [`StaffClient::identify`] is how a staff id becomes the
//! [`Actor`] that order operations are authorized against.
use crate::model::{Actor, StaffCreate, StaffId, StaffMember};
use crate::staff_actor::StaffError;
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Staff actor.
#[derive(Clone)]
pub struct StaffClient {
    inner: ResourceClient<StaffMember>,
}

impl StaffClient {
    pub fn new(inner: ResourceClient<StaffMember>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn create_staff(&self, params: StaffCreate) -> Result<StaffId, StaffError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    /// The acting identity for staff member `id`.
    #[instrument(skip(self))]
    pub async fn identify(&self, id: StaffId) -> Result<Actor, StaffError> {
        self.get(id)
            .await?
            .map(|member| member.as_actor())
            .ok_or_else(|| StaffError::NotFound(id.to_string()))
    }

    /// First member with this exact name.
    #[instrument(skip(self))]
    pub async fn find_by_name(&self, name: &str) -> Result<Option<StaffMember>, StaffError> {
        Ok(self.list().await?.into_iter().find(|m| m.name == name))
    }
}

#[async_trait]
impl ActorClient<StaffMember> for StaffClient {
    type Error = StaffError;

    fn inner(&self) -> &ResourceClient<StaffMember> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.downcast_entity::<StaffError>() {
            Ok(staff_error) => staff_error,
            Err(FrameworkError::NotFound(id)) => StaffError::NotFound(id),
            Err(other) => StaffError::ActorCommunicationError(other.to_string()),
        }
    }
}
