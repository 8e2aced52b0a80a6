//! Authorization gate: role-based decision point for mutations
//!
//! Decision order for create/update/delete:
//! 1. the acting identity must exist (`IdentityNotFound`)
//! 2. the caller's token must belong to the acting identity (`Forbidden`)
//! 3. the acting identity's stored role must be admin (`Forbidden`)
//!
//! Step 2 is stricter than a role-only check: an admin token acting as a
//! different admin is also `Forbidden`. Callers always act as themselves.
//!
//! There is no per-record ownership check: any admin may mutate any record.

use tracing::{debug, warn};

use crate::error::{CookbookError, Result};

use super::directory::IdentityDirectory;
use super::token::TokenService;
use super::types::*;

/// Operation class being authorized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Read)
    }
}

/// Outcome of a successful authorization
#[derive(Debug, Clone)]
pub enum Access {
    /// Reads are ungated
    Public,
    /// Mutation granted to this admin identity
    Admin(Identity),
}

#[derive(Clone)]
pub struct AuthorizationGate {
    tokens: TokenService,
    directory: IdentityDirectory,
}

impl AuthorizationGate {
    pub fn new(tokens: TokenService, directory: IdentityDirectory) -> Self {
        Self { tokens, directory }
    }

    /// Turn a presented token into claims; absent or invalid is `Unauthenticated`
    pub fn authenticate(&self, token: Option<&str>) -> Result<SessionClaims> {
        token
            .and_then(|t| self.tokens.validate(t))
            .ok_or(CookbookError::Unauthenticated)
    }

    pub async fn authorize(
        &self,
        caller: &SessionClaims,
        acting_as: &str,
        op: Operation,
    ) -> Result<Access> {
        if !op.is_mutation() {
            return Ok(Access::Public);
        }

        let actor = self
            .directory
            .find_by_id(acting_as)
            .await?
            .ok_or_else(|| CookbookError::IdentityNotFound(acting_as.to_string()))?;

        if caller.identity_id != actor.id {
            warn!(
                caller = %caller.identity_id,
                acting_as = %actor.id,
                op = op.as_str(),
                "Caller attempted to act as another identity"
            );
            return Err(CookbookError::Forbidden(format!(
                "Not permitted to {} as another identity",
                op.as_str()
            )));
        }

        if !actor.role.is_admin() {
            debug!(identity_id = %actor.id, op = op.as_str(), "Mutation denied: not admin");
            return Err(CookbookError::Forbidden(format!(
                "Admin role required to {}",
                op.as_str()
            )));
        }

        Ok(Access::Admin(actor))
    }

    /// Self-service profile updates only need the target to exist
    pub async fn authorize_self_service(&self, target_id: &str) -> Result<Identity> {
        self.directory
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| CookbookError::IdentityNotFound(target_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_classes() {
        assert!(!Operation::Read.is_mutation());
        for op in [Operation::Create, Operation::Update, Operation::Delete] {
            assert!(op.is_mutation());
        }
        assert_eq!(Operation::Delete.as_str(), "delete");
    }
}
