//! Wiring: one store, two actors, and the services built on them

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{
    AccountService, Authenticator, AuthorizationGate, CredentialStore, DirectoryActor,
    IdentityDirectory, SecretPolicy, TokenService,
};
use crate::config::CookbookConfig;
use crate::content::{CatalogActor, RecipeService};
use crate::error::Result;
use crate::store::DeltaStore;

/// Entry point for embedding the cookbook backend.
///
/// Cheap to clone; every clone talks to the same actors.
#[derive(Clone)]
pub struct Cookbook {
    store: Arc<DeltaStore>,
    directory: IdentityDirectory,
    auth: Authenticator,
    accounts: AccountService,
    recipes: RecipeService,
    gate: AuthorizationGate,
}

impl Cookbook {
    /// Open (or create) the tables under `config.base_path` and spawn the actors.
    ///
    /// Must be called inside a tokio runtime.
    pub async fn open(config: CookbookConfig) -> Result<Self> {
        let credentials = CredentialStore::new(config.hash)?;
        let tokens = TokenService::new(config.token_secret.as_deref(), config.token_ttl_days);
        if !tokens.is_configured() {
            warn!("No token secret configured; logins will fail and every token is rejected");
        }

        let policy = SecretPolicy {
            min_len: config.min_secret_len,
            max_len: config.max_secret_len,
        };
        let buffer = config.actor_buffer;
        let store = Arc::new(DeltaStore::new(config).await?);

        let directory =
            DirectoryActor::spawn(Arc::clone(&store), credentials.clone(), policy, buffer);
        let catalog = CatalogActor::spawn(Arc::clone(&store), buffer);

        let gate = AuthorizationGate::new(tokens.clone(), directory.clone());
        let auth = Authenticator::new(directory.clone(), credentials, tokens);
        let accounts = AccountService::new(directory.clone(), gate.clone());
        let recipes = RecipeService::new(gate.clone(), catalog);

        info!("Cookbook ready");
        Ok(Self {
            store,
            directory,
            auth,
            accounts,
            recipes,
            gate,
        })
    }

    pub fn auth(&self) -> &Authenticator {
        &self.auth
    }

    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    pub fn recipes(&self) -> &RecipeService {
        &self.recipes
    }

    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    pub fn directory(&self) -> &IdentityDirectory {
        &self.directory
    }

    pub fn store(&self) -> &DeltaStore {
        &self.store
    }
}
