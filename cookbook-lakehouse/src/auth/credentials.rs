//! Credential store: Argon2id hashing and verification
//!
//! Hashing is CPU-bound. The async entry points push the work onto tokio's
//! blocking pool so a slow hash never stalls the reactor or an actor loop.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use uuid::Uuid;

use crate::config::HashWorkFactor;
use crate::error::{CookbookError, Result};

#[derive(Clone)]
pub struct CredentialStore {
    params: Params,
}

impl CredentialStore {
    /// Fails only if the work factor is outside Argon2's accepted ranges
    pub fn new(work: HashWorkFactor) -> Result<Self> {
        let params = Params::new(work.memory_kib, work.iterations, work.parallelism, None)
            .map_err(|e| CookbookError::Config(format!("invalid argon2 work factor: {e}")))?;
        Ok(Self { params })
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Salted one-way hash in PHC string format
    pub fn hash_blocking(&self, secret: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.hasher()
            .hash_password(secret.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| CookbookError::Internal(format!("hashing failed: {e}")))
    }

    /// `false` on mismatch and on any malformed hash; never errors
    pub fn verify_blocking(&self, secret: &str, hashed: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hashed) else {
            return false;
        };
        self.hasher()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }

    pub async fn hash(&self, secret: String) -> Result<String> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.hash_blocking(&secret)).await?
    }

    pub async fn verify(&self, secret: String, hashed: String) -> bool {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.verify_blocking(&secret, &hashed))
            .await
            .unwrap_or(false)
    }

    /// Throwaway secret for identities that never log in with one
    pub fn random_secret() -> String {
        format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
    }
}
