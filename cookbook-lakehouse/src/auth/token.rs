//! Token service: HS256-signed stateless session tokens
//!
//! Claims are `{sub, role, iat}` plus `exp` only when a TTL is configured.
//! Validation fails closed: a missing secret, a bad signature, an unknown
//! role or any decoding problem all yield `None`.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CookbookError, Result};

use super::types::{Role, SessionClaims};

/// JWT claims for session tokens
#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    /// Subject (identity id)
    sub: String,
    role: Role,
    /// Issued at (Unix timestamp)
    iat: usize,
    /// Expiry (Unix timestamp), only with a configured TTL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<usize>,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

#[derive(Clone)]
pub struct TokenService {
    keys: Option<Arc<SigningKeys>>,
    ttl: Option<Duration>,
}

impl TokenService {
    /// An absent or blank secret yields a service that refuses everything
    pub fn new(secret: Option<&str>, ttl_days: Option<u32>) -> Self {
        let keys = secret
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                Arc::new(SigningKeys {
                    encoding: EncodingKey::from_secret(s.as_bytes()),
                    decoding: DecodingKey::from_secret(s.as_bytes()),
                })
            });
        Self {
            keys,
            ttl: ttl_days.map(|d| Duration::days(d as i64)),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.keys.is_some()
    }

    pub fn issue(&self, identity_id: &str, role: Role) -> Result<String> {
        let keys = self.keys.as_ref().ok_or(CookbookError::SigningKeyMissing)?;

        let now = Utc::now();
        let claims = JwtClaims {
            sub: identity_id.to_string(),
            role,
            iat: now.timestamp() as usize,
            exp: self.ttl.map(|ttl| (now + ttl).timestamp() as usize),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| CookbookError::TokenSigning(e.to_string()))
    }

    pub fn validate(&self, token: &str) -> Option<SessionClaims> {
        let keys = self.keys.as_ref()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        if self.ttl.is_some() {
            validation.required_spec_claims.insert("exp".to_string());
        } else {
            validation.validate_exp = false;
        }

        match decode::<JwtClaims>(token, &keys.decoding, &validation) {
            Ok(data) if !data.claims.sub.is_empty() => Some(SessionClaims {
                identity_id: data.claims.sub,
                role: data.claims.role,
            }),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "Token rejected");
                None
            }
        }
    }
}
