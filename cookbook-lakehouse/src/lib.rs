//! # Cookbook Lakehouse
//!
//! Identity, authorization and recipe storage for Cookbook, persisted in
//! Delta Lake tables via [delta-rs](https://github.com/delta-io/delta-rs).
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │               cookbook-lakehouse              │
//! ├──────────────┬───────────────┬────────────────┤
//! │ Authenticator│ AccountService│ RecipeService  │
//! │ (register,   │ (get, list,   │ (get, list,    │
//! │  login, fed.)│  update, del.)│  gated writes) │
//! ├──────────────┴──────┬────────┴────────────────┤
//! │  AuthorizationGate  │ TokenService │ Argon2   │
//! ├─────────────────────┼─────────────────────────┤
//! │   DirectoryActor    │     CatalogActor        │
//! │   (identities)      │     (recipes)           │
//! ├─────────────────────┴─────────────────────────┤
//! │                  DeltaStore                   │
//! │   (ACID writes, SQL predicates, counting)     │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cookbook_lakehouse::{Cookbook, CookbookConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CookbookConfig::new("/data/cookbook").with_token_secret("change-me");
//!     let cookbook = Cookbook::open(config).await?;
//!
//!     cookbook
//!         .auth()
//!         .register("Ana".into(), "ana@example.com".into(), "Saffron1".into())
//!         .await?;
//!     let session = cookbook
//!         .auth()
//!         .login("ana@example.com".into(), "Saffron1".into())
//!         .await?;
//!     assert!(cookbook.gate().authenticate(Some(&session.token)).is_ok());
//!
//!     Ok(())
//! }
//! ```
//!
//! All operations return `Result<T, CookbookError>`; see [`ErrorKind`] for
//! the caller-facing classification.

pub mod auth;
pub mod config;
pub mod content;
pub mod cookbook;
pub mod error;
pub mod schema;
pub mod store;

// Re-exports for convenience
pub use config::{CookbookConfig, HashWorkFactor};
pub use cookbook::Cookbook;
pub use error::{CookbookError, ErrorKind, Result};
pub use store::{DeltaStore, PageRequest, SortOrder};

pub use auth::{
    Identity, IdentityListing, IdentityPatch, IdentityQuery, IdentityView, Role, Session,
    SessionClaims,
};
pub use content::{Recipe, RecipeDraft, RecipeFilter, RecipeListing, RecipePatch, RecipeQuery};
