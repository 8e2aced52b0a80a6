//! Account operations exposed over the identity endpoints
//!
//! Reads are ungated; profile updates need only an existing target;
//! deleting an identity goes through the gate as an admin mutation.

use tracing::info;

use crate::error::{CookbookError, Result};

use super::directory::IdentityDirectory;
use super::gate::{AuthorizationGate, Operation};
use super::types::*;

#[derive(Clone)]
pub struct AccountService {
    directory: IdentityDirectory,
    gate: AuthorizationGate,
}

impl AccountService {
    pub fn new(directory: IdentityDirectory, gate: AuthorizationGate) -> Self {
        Self { directory, gate }
    }

    pub async fn get(&self, id: &str) -> Result<IdentityView> {
        self.directory
            .find_by_id(id)
            .await?
            .map(|identity| identity.view())
            .ok_or_else(|| CookbookError::IdentityNotFound(id.to_string()))
    }

    pub async fn list(&self, query: IdentityQuery) -> Result<IdentityListing> {
        self.directory.list(query).await
    }

    pub async fn update_profile(&self, id: &str, patch: IdentityPatch) -> Result<IdentityView> {
        let target = self.gate.authorize_self_service(id).await?;
        let updated = self.directory.update_by_id(&target.id, patch).await?;
        Ok(updated.view())
    }

    /// Admin-gated removal of `target_id`, performed as `acting_as`
    pub async fn delete_identity(
        &self,
        caller: &SessionClaims,
        acting_as: &str,
        target_id: &str,
    ) -> Result<()> {
        self.gate
            .authorize(caller, acting_as, Operation::Delete)
            .await?;
        self.directory.delete_by_id(target_id).await?;
        info!(acting_as, target_id, "Identity removed by admin");
        Ok(())
    }
}
