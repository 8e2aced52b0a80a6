//! CatalogActor: Tokio actor owning the `recipes` table
//!
//! Same shape as the directory actor: a single task drains an mpsc queue,
//! callers hold a cloneable [`RecipeCatalog`] handle. Access control is not
//! this layer's concern; see [`super::service::RecipeService`].

use std::sync::Arc;

use chrono::Utc;
use deltalake::arrow::array::{ArrayRef, RecordBatch, StringArray};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::directory::one_month_ago;
use crate::error::{CookbookError, Result};
use crate::schema;
use crate::store::{
    format_timestamp, opt_value, parse_timestamp, quote_literal, utf8_column, DeltaStore,
};

use super::types::*;

// ─── Actor Messages ───

enum CatalogMsg {
    Get {
        id: String,
        reply: oneshot::Sender<Result<Option<Recipe>>>,
    },
    List {
        query: RecipeQuery,
        reply: oneshot::Sender<Result<RecipeListing>>,
    },
    Create {
        record: Recipe,
        reply: oneshot::Sender<Result<Recipe>>,
    },
    Update {
        id: String,
        patch: RecipePatch,
        reply: oneshot::Sender<Result<Recipe>>,
    },
    Delete {
        id: String,
        reply: oneshot::Sender<Result<()>>,
    },
}

// ─── Actor ───

pub struct CatalogActor {
    store: Arc<DeltaStore>,
    rx: mpsc::Receiver<CatalogMsg>,
}

impl CatalogActor {
    pub fn spawn(store: Arc<DeltaStore>, buffer: usize) -> RecipeCatalog {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let actor = Self { store, rx };

        tokio::spawn(actor.run());
        info!("CatalogActor spawned");
        RecipeCatalog { tx }
    }

    async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                CatalogMsg::Get { id, reply } => {
                    let _ = reply.send(self.handle_get(&id).await);
                }
                CatalogMsg::List { query, reply } => {
                    let _ = reply.send(self.handle_list(query).await);
                }
                CatalogMsg::Create { record, reply } => {
                    let _ = reply.send(self.handle_create(record).await);
                }
                CatalogMsg::Update { id, patch, reply } => {
                    let _ = reply.send(self.handle_update(&id, patch).await);
                }
                CatalogMsg::Delete { id, reply } => {
                    let _ = reply.send(self.handle_delete(&id).await);
                }
            }
        }
        info!("CatalogActor stopped");
    }

    // ─── Handler Implementations ───

    async fn handle_get(&self, id: &str) -> Result<Option<Recipe>> {
        let batches = self
            .store
            .query(schema::TABLE_RECIPES, &format!("id = {}", quote_literal(id)))
            .await?;
        for batch in &batches {
            if let Some(recipe) = recipes_from_batch(batch)?.into_iter().next() {
                return Ok(Some(recipe));
            }
        }
        Ok(None)
    }

    async fn handle_list(&self, query: RecipeQuery) -> Result<RecipeListing> {
        let batches = self
            .store
            .query_page(
                schema::TABLE_RECIPES,
                &query.filter.to_predicate(),
                "updated_at",
                query.page,
            )
            .await?;

        let mut recipes = Vec::new();
        for batch in &batches {
            recipes.extend(recipes_from_batch(batch)?);
        }

        let total = self.store.count(schema::TABLE_RECIPES, "true").await?;
        let last_month = self
            .store
            .count(
                schema::TABLE_RECIPES,
                &format!("created_at >= {}", quote_literal(&one_month_ago())),
            )
            .await?;

        debug!(returned = recipes.len(), total, last_month, "Listed recipes");
        Ok(RecipeListing {
            recipes,
            total,
            last_month,
        })
    }

    async fn handle_create(&self, record: Recipe) -> Result<Recipe> {
        self.store
            .append(schema::TABLE_RECIPES, recipe_batch(&record)?)
            .await?;
        info!(recipe_id = %record.id, slug = %record.slug, "Recipe created");
        Ok(record)
    }

    async fn handle_update(&self, id: &str, patch: RecipePatch) -> Result<Recipe> {
        let mut recipe = self
            .handle_get(id)
            .await?
            .ok_or_else(|| CookbookError::RecipeNotFound(id.to_string()))?;

        if patch.is_empty() {
            return Ok(recipe);
        }

        let now = Utc::now();
        let mut assignments: Vec<(&str, String)> = Vec::new();
        if let Some(title) = patch.title {
            assignments.push(("title", quote_literal(&title)));
            recipe.title = title;
        }
        if let Some(preparation) = patch.preparation {
            assignments.push(("preparation", quote_literal(&preparation)));
            recipe.preparation = preparation;
        }
        if let Some(ingredients) = patch.ingredients {
            assignments.push(("ingredients", quote_literal(&ingredients)));
            recipe.ingredients = ingredients;
        }
        if let Some(image) = patch.image {
            assignments.push(("image", quote_literal(&image)));
            recipe.image = Some(image);
        }
        assignments.push(("updated_at", quote_literal(&format_timestamp(now))));
        recipe.updated_at = now;

        self.store
            .update(
                schema::TABLE_RECIPES,
                &format!("id = {}", quote_literal(id)),
                &assignments,
            )
            .await?;
        info!(recipe_id = %id, "Recipe updated");
        Ok(recipe)
    }

    async fn handle_delete(&self, id: &str) -> Result<()> {
        let predicate = format!("id = {}", quote_literal(id));
        if self.store.count(schema::TABLE_RECIPES, &predicate).await? == 0 {
            return Err(CookbookError::RecipeNotFound(id.to_string()));
        }

        self.store.delete(schema::TABLE_RECIPES, &predicate).await?;
        info!(recipe_id = %id, "Recipe deleted");
        Ok(())
    }
}

fn recipe_batch(recipe: &Recipe) -> Result<RecordBatch> {
    let created = format_timestamp(recipe.created_at);
    let updated = format_timestamp(recipe.updated_at);
    Ok(RecordBatch::try_new(
        Arc::new(schema::recipes_arrow_schema()),
        vec![
            Arc::new(StringArray::from(vec![recipe.id.as_str()])) as ArrayRef,
            Arc::new(StringArray::from(vec![recipe.title.as_str()])),
            Arc::new(StringArray::from(vec![recipe.preparation.as_str()])),
            Arc::new(StringArray::from(vec![recipe.ingredients.as_str()])),
            Arc::new(StringArray::from(vec![recipe.image.as_deref()])),
            Arc::new(StringArray::from(vec![recipe.owner_id.as_str()])),
            Arc::new(StringArray::from(vec![recipe.slug.as_str()])),
            Arc::new(StringArray::from(vec![created.as_str()])),
            Arc::new(StringArray::from(vec![updated.as_str()])),
        ],
    )?)
}

fn recipes_from_batch(batch: &RecordBatch) -> Result<Vec<Recipe>> {
    let id = utf8_column(batch, "id")?;
    let title = utf8_column(batch, "title")?;
    let preparation = utf8_column(batch, "preparation")?;
    let ingredients = utf8_column(batch, "ingredients")?;
    let image = utf8_column(batch, "image")?;
    let owner_id = utf8_column(batch, "owner_id")?;
    let slug = utf8_column(batch, "slug")?;
    let created_at = utf8_column(batch, "created_at")?;
    let updated_at = utf8_column(batch, "updated_at")?;

    (0..batch.num_rows())
        .map(|i| {
            Ok(Recipe {
                id: id.value(i).to_string(),
                title: title.value(i).to_string(),
                preparation: preparation.value(i).to_string(),
                ingredients: ingredients.value(i).to_string(),
                image: opt_value(&image, i),
                owner_id: owner_id.value(i).to_string(),
                slug: slug.value(i).to_string(),
                created_at: parse_timestamp(created_at.value(i))?,
                updated_at: parse_timestamp(updated_at.value(i))?,
            })
        })
        .collect()
}

// ─── Handle (client-facing API) ───

/// Thread-safe handle to the catalog actor
#[derive(Clone)]
pub struct RecipeCatalog {
    tx: mpsc::Sender<CatalogMsg>,
}

impl RecipeCatalog {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T>>) -> CatalogMsg,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| CookbookError::ActorUnavailable("CatalogActor".into()))?;
        rx.await
            .map_err(|_| CookbookError::ActorUnavailable("CatalogActor dropped".into()))?
    }

    pub async fn get(&self, id: &str) -> Result<Option<Recipe>> {
        let id = id.to_string();
        self.request(|reply| CatalogMsg::Get { id, reply }).await
    }

    pub async fn list(&self, query: RecipeQuery) -> Result<RecipeListing> {
        self.request(|reply| CatalogMsg::List { query, reply }).await
    }

    /// Insert a recipe owned by `owner_id`; the slug comes from the title
    pub async fn create(&self, owner_id: &str, draft: RecipeDraft) -> Result<Recipe> {
        draft.validate()?;

        let now = Utc::now();
        let record = Recipe {
            id: Uuid::new_v4().to_string(),
            slug: slugify(&draft.title),
            title: draft.title,
            preparation: draft.preparation,
            ingredients: draft.ingredients,
            image: draft.image,
            owner_id: owner_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.request(|reply| CatalogMsg::Create { record, reply })
            .await
    }

    pub async fn update(&self, id: &str, patch: RecipePatch) -> Result<Recipe> {
        patch.validate()?;
        let id = id.to_string();
        self.request(|reply| CatalogMsg::Update { id, patch, reply })
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.request(|reply| CatalogMsg::Delete { id, reply }).await
    }
}
