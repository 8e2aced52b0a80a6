//! Authentication flow: registration, credential login, federated login
//!
//! Each entry point stops at the first failure and returns it; nothing
//! after a failed step runs.

use tracing::{debug, info, warn};

use crate::error::{CookbookError, Result};

use super::credentials::CredentialStore;
use super::directory::IdentityDirectory;
use super::token::TokenService;
use super::types::*;

#[derive(Clone)]
pub struct Authenticator {
    directory: IdentityDirectory,
    credentials: CredentialStore,
    tokens: TokenService,
}

impl Authenticator {
    pub fn new(
        directory: IdentityDirectory,
        credentials: CredentialStore,
        tokens: TokenService,
    ) -> Self {
        Self {
            directory,
            credentials,
            tokens,
        }
    }

    /// Create a standard identity. Fails with a conflict if the address is taken.
    pub async fn register(
        &self,
        display_name: String,
        address: String,
        secret: String,
    ) -> Result<IdentityView> {
        if self.directory.find_by_address(&address).await?.is_some() {
            return Err(CookbookError::IdentityAlreadyExists(address));
        }

        let identity = self
            .directory
            .create(display_name, address, secret, IdentityExtras::default())
            .await?;
        info!(identity_id = %identity.id, "Identity registered");
        Ok(identity.view())
    }

    /// Verify the secret and open a session.
    ///
    /// Unknown address and wrong secret produce the same error.
    pub async fn login(&self, address: String, secret: String) -> Result<Session> {
        let Some(identity) = self.directory.find_by_address(&address).await? else {
            debug!("Login rejected: unknown address");
            return Err(CookbookError::InvalidCredentials);
        };

        if !self
            .credentials
            .verify(secret, identity.secret_hash.clone())
            .await
        {
            debug!(identity_id = %identity.id, "Login rejected: secret mismatch");
            return Err(CookbookError::InvalidCredentials);
        }

        let session = self.open_session(&identity)?;
        info!(identity_id = %identity.id, "Login successful");
        Ok(session)
    }

    /// Upsert login for an identity already verified by a third party.
    ///
    /// A first-time address gets a new standard identity with a random,
    /// never-disclosed secret.
    pub async fn federated_login(
        &self,
        display_name: String,
        address: String,
        avatar: Option<String>,
    ) -> Result<Session> {
        if let Some(identity) = self.directory.find_by_address(&address).await? {
            info!(identity_id = %identity.id, "Federated login (existing identity)");
            return self.open_session(&identity);
        }

        let extras = IdentityExtras {
            profile_image: avatar,
            role: Role::Standard,
        };
        let created = self
            .directory
            .create_with_generated_secret(display_name, address.clone(), extras)
            .await;

        let identity = match created {
            Ok(identity) => {
                info!(identity_id = %identity.id, "Federated login (new identity)");
                identity
            }
            // A concurrent federated login for the same address got there first
            Err(CookbookError::IdentityAlreadyExists(_)) => self
                .directory
                .find_by_address(&address)
                .await?
                .ok_or_else(|| CookbookError::Internal("identity vanished after conflict".into()))?,
            Err(e) => return Err(e),
        };

        self.open_session(&identity)
    }

    /// The server keeps no session state; clearing the token is up to transport.
    pub fn logout(&self, claims: Option<&SessionClaims>) {
        match claims {
            Some(c) => info!(identity_id = %c.identity_id, "Logout"),
            None => debug!("Logout without a valid session"),
        }
    }

    /// Seed an admin identity if the address is not registered yet.
    ///
    /// An existing identity at that address is returned untouched, whatever its role.
    pub async fn ensure_admin(
        &self,
        display_name: String,
        address: String,
        secret: String,
    ) -> Result<IdentityView> {
        if let Some(existing) = self.directory.find_by_address(&address).await? {
            if !existing.role.is_admin() {
                warn!(identity_id = %existing.id, "Bootstrap admin address belongs to a standard identity");
            }
            return Ok(existing.view());
        }

        let extras = IdentityExtras {
            profile_image: None,
            role: Role::Admin,
        };
        let identity = self
            .directory
            .create(display_name, address, secret, extras)
            .await?;
        info!(identity_id = %identity.id, "Bootstrap admin created");
        Ok(identity.view())
    }

    fn open_session(&self, identity: &Identity) -> Result<Session> {
        let token = self.tokens.issue(&identity.id, identity.role)?;
        Ok(Session {
            identity: identity.view(),
            token,
        })
    }
}
