//! Configuration for the Cookbook lakehouse
//!
//! Everything process-wide (signing secret, hashing work factor) lives here
//! and is handed to the services that need it at construction time.

use std::path::{Path, PathBuf};

use crate::error::{CookbookError, Result};

/// Argon2 cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashWorkFactor {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl HashWorkFactor {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }
}

impl Default for HashWorkFactor {
    /// OWASP-recommended Argon2id baseline (19 MiB, 2 passes, 1 lane)
    fn default() -> Self {
        Self::new(19 * 1024, 2, 1)
    }
}

/// Cookbook configuration
#[derive(Debug, Clone)]
pub struct CookbookConfig {
    /// Root path for all Delta tables
    pub base_path: PathBuf,

    /// HMAC secret for session token signing. `None` makes the token
    /// service refuse to issue and reject every token.
    pub token_secret: Option<String>,

    /// Session token lifetime in days. `None` issues tokens without expiry.
    pub token_ttl_days: Option<u32>,

    /// Argon2 work factor
    pub hash: HashWorkFactor,

    /// Minimum accepted secret length (characters)
    pub min_secret_len: usize,

    /// Maximum accepted secret length (characters)
    pub max_secret_len: usize,

    /// Mailbox capacity for the directory and catalog actors
    pub actor_buffer: usize,
}

impl CookbookConfig {
    /// Create config with sensible defaults
    ///
    /// # Arguments
    /// * `base_path` - Root directory for Delta tables.
    ///   Structure created:
    ///   ```text
    ///   base_path/
    ///   ├── identities/   (Delta table)
    ///   └── recipes/      (Delta table)
    ///   ```
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            token_secret: None,
            token_ttl_days: None,
            hash: HashWorkFactor::default(),
            min_secret_len: 6,
            max_secret_len: 128,
            actor_buffer: 256,
        }
    }

    /// Build a config from `COOKBOOK_*` environment variables.
    ///
    /// Fails when `COOKBOOK_TOKEN_SECRET` is absent or empty.
    pub fn from_env() -> Result<Self> {
        let base_path =
            std::env::var("COOKBOOK_DATA_DIR").unwrap_or_else(|_| "./data/cookbook".to_string());

        let secret = std::env::var("COOKBOOK_TOKEN_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| CookbookError::Config("COOKBOOK_TOKEN_SECRET must be set".into()))?;

        let defaults = HashWorkFactor::default();
        let hash = HashWorkFactor::new(
            env_number("COOKBOOK_HASH_MEMORY_KIB")?.unwrap_or(defaults.memory_kib),
            env_number("COOKBOOK_HASH_ITERATIONS")?.unwrap_or(defaults.iterations),
            env_number("COOKBOOK_HASH_PARALLELISM")?.unwrap_or(defaults.parallelism),
        );

        let mut config = Self::new(base_path)
            .with_token_secret(secret)
            .with_hash_work_factor(hash);
        config.token_ttl_days = env_number("COOKBOOK_TOKEN_TTL_DAYS")?;
        Ok(config)
    }

    /// Override token signing secret
    pub fn with_token_secret(mut self, secret: impl Into<String>) -> Self {
        self.token_secret = Some(secret.into());
        self
    }

    /// Give issued tokens an expiry
    pub fn with_token_ttl_days(mut self, days: u32) -> Self {
        self.token_ttl_days = Some(days);
        self
    }

    /// Override Argon2 cost parameters
    pub fn with_hash_work_factor(mut self, hash: HashWorkFactor) -> Self {
        self.hash = hash;
        self
    }

    /// Override minimum secret length
    pub fn with_min_secret_len(mut self, len: usize) -> Self {
        self.min_secret_len = len;
        self
    }

    /// Override maximum secret length
    pub fn with_max_secret_len(mut self, len: usize) -> Self {
        self.max_secret_len = len;
        self
    }

    /// Get path for a specific table
    pub fn table_path(&self, table_name: &str) -> PathBuf {
        self.base_path.join(table_name)
    }

    /// Get table URI (string) for delta-rs
    pub fn table_uri(&self, table_name: &str) -> String {
        self.table_path(table_name).to_string_lossy().to_string()
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| CookbookError::Config(format!("{key} is not a valid number: {raw}"))),
        Err(_) => Ok(None),
    }
}
