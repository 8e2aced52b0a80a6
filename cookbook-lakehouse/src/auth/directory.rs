//! DirectoryActor: Tokio actor owning the `identities` table
//!
//! All directory operations are processed sequentially via an mpsc channel.
//! That makes "address not taken → insert" a single step with respect to
//! every other directory write in the process, so two concurrent
//! registrations of one address cannot both succeed.
//!
//! Secrets are hashed in the caller's task (on the blocking pool) before the
//! message is sent; the actor itself only ever sees hashes.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cookbook_lakehouse::auth::{CredentialStore, DirectoryActor, IdentityExtras, SecretPolicy};
//! use cookbook_lakehouse::{CookbookConfig, DeltaStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CookbookConfig::new("/data/cookbook");
//!     let credentials = CredentialStore::new(config.hash)?;
//!     let store = Arc::new(DeltaStore::new(config).await?);
//!     let policy = SecretPolicy { min_len: 6, max_len: 128 };
//!     let directory = DirectoryActor::spawn(store, credentials, policy, 256);
//!
//!     let ana = directory
//!         .create("Ana".into(), "ana@example.com".into(), "Saffron1".into(), IdentityExtras::default())
//!         .await?;
//!     assert!(directory.find_by_id(&ana.id).await?.is_some());
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use chrono::{Months, Utc};
use deltalake::arrow::array::{ArrayRef, RecordBatch, StringArray};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{CookbookError, Result};
use crate::schema;
use crate::store::{
    format_timestamp, opt_value, parse_timestamp, quote_literal, utf8_column, DeltaStore,
};

use super::credentials::CredentialStore;
use super::types::*;
use super::validate::{self, SecretPolicy};

// ─── Actor Messages ───

enum DirectoryMsg {
    FindByAddress {
        address: String,
        reply: oneshot::Sender<Result<Option<Identity>>>,
    },
    FindById {
        id: String,
        reply: oneshot::Sender<Result<Option<Identity>>>,
    },
    Create {
        record: Identity,
        reply: oneshot::Sender<Result<Identity>>,
    },
    Update {
        id: String,
        changes: IdentityChanges,
        reply: oneshot::Sender<Result<Identity>>,
    },
    Delete {
        id: String,
        reply: oneshot::Sender<Result<()>>,
    },
    List {
        query: IdentityQuery,
        reply: oneshot::Sender<Result<IdentityListing>>,
    },
}

/// Validated, already-hashed form of an `IdentityPatch`
#[derive(Default)]
struct IdentityChanges {
    display_name: Option<String>,
    address: Option<String>,
    secret_hash: Option<String>,
    profile_image: Option<String>,
}

impl IdentityChanges {
    fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.address.is_none()
            && self.secret_hash.is_none()
            && self.profile_image.is_none()
    }
}

// ─── Actor ───

/// Directory actor: processes identity reads and writes sequentially
pub struct DirectoryActor {
    store: Arc<DeltaStore>,
    rx: mpsc::Receiver<DirectoryMsg>,
}

impl DirectoryActor {
    /// Spawn the directory actor on a shared store and return its handle
    pub fn spawn(
        store: Arc<DeltaStore>,
        credentials: CredentialStore,
        policy: SecretPolicy,
        buffer: usize,
    ) -> IdentityDirectory {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let actor = Self { store, rx };

        tokio::spawn(actor.run());
        info!("DirectoryActor spawned");
        IdentityDirectory {
            tx,
            credentials,
            policy,
        }
    }

    /// Main event loop
    async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                DirectoryMsg::FindByAddress { address, reply } => {
                    let _ = reply.send(self.handle_find_by_address(&address).await);
                }
                DirectoryMsg::FindById { id, reply } => {
                    let _ = reply.send(self.handle_find_by_id(&id).await);
                }
                DirectoryMsg::Create { record, reply } => {
                    let _ = reply.send(self.handle_create(record).await);
                }
                DirectoryMsg::Update { id, changes, reply } => {
                    let _ = reply.send(self.handle_update(&id, changes).await);
                }
                DirectoryMsg::Delete { id, reply } => {
                    let _ = reply.send(self.handle_delete(&id).await);
                }
                DirectoryMsg::List { query, reply } => {
                    let _ = reply.send(self.handle_list(query).await);
                }
            }
        }
        info!("DirectoryActor stopped");
    }

    // ─── Handler Implementations ───

    async fn handle_find_by_address(&self, address: &str) -> Result<Option<Identity>> {
        self.find_one(&format!("address = {}", quote_literal(address)))
            .await
    }

    async fn handle_find_by_id(&self, id: &str) -> Result<Option<Identity>> {
        self.find_one(&format!("id = {}", quote_literal(id))).await
    }

    async fn handle_create(&self, record: Identity) -> Result<Identity> {
        if self.handle_find_by_address(&record.address).await?.is_some() {
            return Err(CookbookError::IdentityAlreadyExists(record.address));
        }

        self.store
            .append(schema::TABLE_IDENTITIES, identity_batch(&record)?)
            .await?;
        info!(identity_id = %record.id, role = %record.role, "Identity created");
        Ok(record)
    }

    async fn handle_update(&self, id: &str, changes: IdentityChanges) -> Result<Identity> {
        let mut identity = self
            .handle_find_by_id(id)
            .await?
            .ok_or_else(|| CookbookError::IdentityNotFound(id.to_string()))?;

        if changes.is_empty() {
            return Ok(identity);
        }

        if let Some(address) = changes.address.as_deref() {
            if address != identity.address {
                if let Some(holder) = self.handle_find_by_address(address).await? {
                    if holder.id != identity.id {
                        return Err(CookbookError::IdentityAlreadyExists(address.to_string()));
                    }
                }
            }
        }

        let now = Utc::now();
        let mut assignments: Vec<(&str, String)> = Vec::new();
        if let Some(name) = changes.display_name {
            assignments.push(("display_name", quote_literal(&name)));
            identity.display_name = name;
        }
        if let Some(address) = changes.address {
            assignments.push(("address", quote_literal(&address)));
            identity.address = address;
        }
        if let Some(hash) = changes.secret_hash {
            assignments.push(("secret_hash", quote_literal(&hash)));
            identity.secret_hash = hash;
        }
        if let Some(image) = changes.profile_image {
            assignments.push(("profile_image", quote_literal(&image)));
            identity.profile_image = Some(image);
        }
        assignments.push(("updated_at", quote_literal(&format_timestamp(now))));
        identity.updated_at = now;

        self.store
            .update(
                schema::TABLE_IDENTITIES,
                &format!("id = {}", quote_literal(id)),
                &assignments,
            )
            .await?;
        info!(identity_id = %id, "Identity updated");
        Ok(identity)
    }

    async fn handle_delete(&self, id: &str) -> Result<()> {
        let predicate = format!("id = {}", quote_literal(id));
        if self.store.count(schema::TABLE_IDENTITIES, &predicate).await? == 0 {
            return Err(CookbookError::IdentityNotFound(id.to_string()));
        }

        self.store
            .delete(schema::TABLE_IDENTITIES, &predicate)
            .await?;
        info!(identity_id = %id, "Identity deleted");
        Ok(())
    }

    async fn handle_list(&self, query: IdentityQuery) -> Result<IdentityListing> {
        let batches = self
            .store
            .query_page(schema::TABLE_IDENTITIES, "true", "created_at", query.page)
            .await?;

        let mut identities = Vec::new();
        for batch in &batches {
            identities.extend(identities_from_batch(batch)?.iter().map(Identity::view));
        }

        let total = self.store.count(schema::TABLE_IDENTITIES, "true").await?;
        let last_month = self
            .store
            .count(
                schema::TABLE_IDENTITIES,
                &format!("created_at >= {}", quote_literal(&one_month_ago())),
            )
            .await?;

        debug!(returned = identities.len(), total, last_month, "Listed identities");
        Ok(IdentityListing {
            identities,
            total,
            last_month,
        })
    }

    // ─── Helpers ───

    async fn find_one(&self, predicate: &str) -> Result<Option<Identity>> {
        let batches = self
            .store
            .query(schema::TABLE_IDENTITIES, predicate)
            .await?;
        for batch in &batches {
            if let Some(identity) = identities_from_batch(batch)?.into_iter().next() {
                return Ok(Some(identity));
            }
        }
        Ok(None)
    }
}

pub(crate) fn one_month_ago() -> String {
    let now = Utc::now();
    format_timestamp(now.checked_sub_months(Months::new(1)).unwrap_or(now))
}

fn identity_batch(identity: &Identity) -> Result<RecordBatch> {
    let created = format_timestamp(identity.created_at);
    let updated = format_timestamp(identity.updated_at);
    Ok(RecordBatch::try_new(
        Arc::new(schema::identities_arrow_schema()),
        vec![
            Arc::new(StringArray::from(vec![identity.id.as_str()])) as ArrayRef,
            Arc::new(StringArray::from(vec![identity.display_name.as_str()])),
            Arc::new(StringArray::from(vec![identity.address.as_str()])),
            Arc::new(StringArray::from(vec![identity.secret_hash.as_str()])),
            Arc::new(StringArray::from(vec![identity.role.as_str()])),
            Arc::new(StringArray::from(vec![identity.profile_image.as_deref()])),
            Arc::new(StringArray::from(vec![created.as_str()])),
            Arc::new(StringArray::from(vec![updated.as_str()])),
        ],
    )?)
}

fn identities_from_batch(batch: &RecordBatch) -> Result<Vec<Identity>> {
    let id = utf8_column(batch, "id")?;
    let display_name = utf8_column(batch, "display_name")?;
    let address = utf8_column(batch, "address")?;
    let secret_hash = utf8_column(batch, "secret_hash")?;
    let role = utf8_column(batch, "role")?;
    let profile_image = utf8_column(batch, "profile_image")?;
    let created_at = utf8_column(batch, "created_at")?;
    let updated_at = utf8_column(batch, "updated_at")?;

    (0..batch.num_rows())
        .map(|i| {
            Ok(Identity {
                id: id.value(i).to_string(),
                display_name: display_name.value(i).to_string(),
                address: address.value(i).to_string(),
                secret_hash: secret_hash.value(i).to_string(),
                role: Role::from_str(role.value(i)),
                profile_image: opt_value(&profile_image, i),
                created_at: parse_timestamp(created_at.value(i))?,
                updated_at: parse_timestamp(updated_at.value(i))?,
            })
        })
        .collect()
}

// ─── Handle (client-facing API) ───

/// Thread-safe handle to the directory actor
#[derive(Clone)]
pub struct IdentityDirectory {
    tx: mpsc::Sender<DirectoryMsg>,
    credentials: CredentialStore,
    policy: SecretPolicy,
}

impl IdentityDirectory {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T>>) -> DirectoryMsg,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| CookbookError::ActorUnavailable("DirectoryActor".into()))?;
        rx.await
            .map_err(|_| CookbookError::ActorUnavailable("DirectoryActor dropped".into()))?
    }

    pub fn secret_policy(&self) -> SecretPolicy {
        self.policy
    }

    pub async fn find_by_address(&self, address: &str) -> Result<Option<Identity>> {
        let address = address.to_string();
        self.request(|reply| DirectoryMsg::FindByAddress { address, reply })
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Identity>> {
        let id = id.to_string();
        self.request(|reply| DirectoryMsg::FindById { id, reply }).await
    }

    /// Validate, hash the secret and insert a new identity.
    ///
    /// Fails with `IdentityAlreadyExists` if the address is taken, including
    /// when another create for it wins the race.
    pub async fn create(
        &self,
        display_name: String,
        address: String,
        secret: String,
        extras: IdentityExtras,
    ) -> Result<Identity> {
        validate::display_name(&display_name)?;
        validate::address(&address)?;
        self.policy.check(&secret)?;
        self.insert(display_name, address, secret, extras).await
    }

    /// Insert a new identity whose secret is generated here and never disclosed.
    ///
    /// Skips the secret policy, which only covers caller-chosen secrets.
    pub async fn create_with_generated_secret(
        &self,
        display_name: String,
        address: String,
        extras: IdentityExtras,
    ) -> Result<Identity> {
        validate::display_name(&display_name)?;
        validate::address(&address)?;
        self.insert(display_name, address, CredentialStore::random_secret(), extras)
            .await
    }

    async fn insert(
        &self,
        display_name: String,
        address: String,
        secret: String,
        extras: IdentityExtras,
    ) -> Result<Identity> {
        let secret_hash = self.credentials.hash(secret).await?;

        let now = Utc::now();
        let record = Identity {
            id: Uuid::new_v4().to_string(),
            display_name,
            address,
            secret_hash,
            role: extras.role,
            profile_image: extras.profile_image,
            created_at: now,
            updated_at: now,
        };
        self.request(|reply| DirectoryMsg::Create { record, reply })
            .await
    }

    /// Apply a partial update. A present-but-empty secret is ignored.
    pub async fn update_by_id(&self, id: &str, patch: IdentityPatch) -> Result<Identity> {
        let mut changes = IdentityChanges::default();

        if let Some(name) = patch.display_name {
            validate::display_name(&name)?;
            changes.display_name = Some(name);
        }
        if let Some(address) = patch.address {
            validate::address(&address)?;
            changes.address = Some(address);
        }
        if let Some(secret) = patch.secret.filter(|s| !s.is_empty()) {
            self.policy.check(&secret)?;
            changes.secret_hash = Some(self.credentials.hash(secret).await?);
        }
        changes.profile_image = patch.profile_image;

        let id = id.to_string();
        self.request(|reply| DirectoryMsg::Update { id, changes, reply })
            .await
    }

    /// Remove an identity. Deleting an unknown (or already deleted) id fails.
    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.request(|reply| DirectoryMsg::Delete { id, reply }).await
    }

    pub async fn list(&self, query: IdentityQuery) -> Result<IdentityListing> {
        self.request(|reply| DirectoryMsg::List { query, reply }).await
    }
}
