//! Recipe operations as seen by callers: reads are open, mutations go
//! through the authorization gate first.

use tracing::info;

use crate::auth::{Access, AuthorizationGate, Operation, SessionClaims};
use crate::error::{CookbookError, Result};

use super::catalog::RecipeCatalog;
use super::types::*;

#[derive(Clone)]
pub struct RecipeService {
    gate: AuthorizationGate,
    catalog: RecipeCatalog,
}

impl RecipeService {
    pub fn new(gate: AuthorizationGate, catalog: RecipeCatalog) -> Self {
        Self { gate, catalog }
    }

    pub async fn get(&self, id: &str) -> Result<Recipe> {
        self.catalog
            .get(id)
            .await?
            .ok_or_else(|| CookbookError::RecipeNotFound(id.to_string()))
    }

    pub async fn list(&self, query: RecipeQuery) -> Result<RecipeListing> {
        self.catalog.list(query).await
    }

    pub async fn create(
        &self,
        caller: &SessionClaims,
        acting_as: &str,
        draft: RecipeDraft,
    ) -> Result<Recipe> {
        let Access::Admin(owner) = self
            .gate
            .authorize(caller, acting_as, Operation::Create)
            .await?
        else {
            return Err(CookbookError::Internal(
                "create was authorized without an acting admin".into(),
            ));
        };
        self.catalog.create(&owner.id, draft).await
    }

    pub async fn update(
        &self,
        caller: &SessionClaims,
        acting_as: &str,
        recipe_id: &str,
        patch: RecipePatch,
    ) -> Result<Recipe> {
        self.gate
            .authorize(caller, acting_as, Operation::Update)
            .await?;
        self.catalog.update(recipe_id, patch).await
    }

    pub async fn delete(
        &self,
        caller: &SessionClaims,
        acting_as: &str,
        recipe_id: &str,
    ) -> Result<()> {
        self.gate
            .authorize(caller, acting_as, Operation::Delete)
            .await?;
        self.catalog.delete(recipe_id).await?;
        info!(acting_as, recipe_id, "Recipe removed by admin");
        Ok(())
    }
}
