//! Content records: recipes stored in the `recipes` Delta table

pub mod catalog;
pub mod service;
pub mod types;

pub use catalog::{CatalogActor, RecipeCatalog};
pub use service::RecipeService;
pub use types::{
    slugify, Recipe, RecipeDraft, RecipeFilter, RecipeListing, RecipePatch, RecipeQuery,
};
