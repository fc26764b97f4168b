//! [`ActorEntity`] implementation for [`StaffMember`].
//!
//! The roster has no commands of its own: members are created, read and
//! removed.

use super::error::StaffError;
use crate::model::{StaffCreate, StaffId, StaffMember};
use actor_framework::ActorEntity;
use async_trait::async_trait;

/// The roster accepts no commands.
#[derive(Debug, Clone)]
pub enum StaffAction {}

#[async_trait]
impl ActorEntity for StaffMember {
    type Id = StaffId;
    type Create = StaffCreate;
    type Action = StaffAction;
    type ActionResult = ();
    type Context = ();
    type Error = StaffError;

    fn from_create_params(id: StaffId, params: StaffCreate) -> Result<Self, StaffError> {
        let name = params.name.trim();
        if name.is_empty() {
            return Err(StaffError::InvalidInput("name is required".to_string()));
        }
        Ok(Self {
            id,
            name: name.to_string(),
            role: params.role,
        })
    }

    async fn handle_action(&mut self, action: StaffAction, _ctx: &()) -> Result<(), StaffError> {
        match action {}
    }
}
