//! Identity domain types: Role, Identity, IdentityView, SessionClaims
//!
//! `Identity` carries the secret hash and is never serialized; everything
//! that leaves the crate goes through `IdentityView`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{PageRequest, SortOrder};

/// Identity roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Standard,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Admin => "admin",
        }
    }

    /// Lenient parse for stored rows; anything unrecognized is `Standard`
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "admin" => Self::Admin,
            _ => Self::Standard,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity record: full data as stored in the Delta `identities` table
#[derive(Clone)]
pub struct Identity {
    pub id: String,
    pub display_name: String,
    pub address: String,
    pub secret_hash: String,
    pub role: Role,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Outward view without the secret hash
    pub fn view(&self) -> IdentityView {
        IdentityView {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            address: self.address.clone(),
            role: self.role,
            profile_image: self.profile_image.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("address", &self.address)
            .field("secret_hash", &"<redacted>")
            .field("role", &self.role)
            .field("profile_image", &self.profile_image)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Identity as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityView {
    pub id: String,
    pub display_name: String,
    pub address: String,
    pub role: Role,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional fields accepted by `IdentityDirectory::create`
#[derive(Debug, Clone, Default)]
pub struct IdentityExtras {
    pub profile_image: Option<String>,
    pub role: Role,
}

/// Partial update for `IdentityDirectory::update_by_id`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityPatch {
    #[serde(alias = "username")]
    pub display_name: Option<String>,
    #[serde(alias = "email")]
    pub address: Option<String>,
    #[serde(alias = "password")]
    pub secret: Option<String>,
    pub profile_image: Option<String>,
}

/// Claims recovered from a valid session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub identity_id: String,
    pub role: Role,
}

/// Successful login: the identity view plus the token to hand to transport
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: IdentityView,
    pub token: String,
}

/// One page of identities plus population counters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityListing {
    pub identities: Vec<IdentityView>,
    pub total: usize,
    pub last_month: usize,
}

/// Listing query for identities
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityQuery {
    pub page: PageRequest,
}

impl IdentityQuery {
    pub fn new(start_index: usize, limit: usize, order: SortOrder) -> Self {
        Self {
            page: PageRequest::new(start_index, limit, order),
        }
    }
}
