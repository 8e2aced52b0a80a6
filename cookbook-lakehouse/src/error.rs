//! Error types for cookbook-lakehouse: Railway Programming
//!
//! All operations return `Result<T, CookbookError>`.
//! No panics, no unwraps in production code paths.
//!
//! Every variant belongs to exactly one [`ErrorKind`]; the HTTP layer only
//! ever looks at the kind and [`CookbookError::public_message`].

use thiserror::Error;

/// Caller-facing error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Unauthorized,
    Forbidden,
    Validation,
    Internal,
}

impl ErrorKind {
    /// HTTP status code for this classification
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::Validation => 400,
            Self::Internal => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for all cookbook operations
#[derive(Error, Debug)]
pub enum CookbookError {
    // ─── Storage Errors ───

    #[error("Delta table error: {0}")]
    DeltaTable(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Schema error: {0}")]
    Schema(String),

    // ─── Identity Errors ───

    #[error("Identity not found: {0}")]
    IdentityNotFound(String),

    #[error("Identity already exists: {0}")]
    IdentityAlreadyExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Signing secret not configured")]
    SigningKeyMissing,

    #[error("Token signing failed: {0}")]
    TokenSigning(String),

    // ─── Content Errors ───

    #[error("Recipe not found: {0}")]
    RecipeNotFound(String),

    // ─── Input Errors ───

    #[error("Invalid input: {0}")]
    Validation(String),

    // ─── Infrastructure Errors ───

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Arrow error: {0}")]
    Arrow(String),

    #[error("DataFusion error: {0}")]
    DataFusion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Actor unavailable: {0}")]
    ActorUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CookbookError {
    /// Classification used for status codes and logging
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IdentityNotFound(_) | Self::RecipeNotFound(_) => ErrorKind::NotFound,
            Self::IdentityAlreadyExists(_) => ErrorKind::Conflict,
            Self::InvalidCredentials | Self::Unauthenticated => ErrorKind::Unauthorized,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Validation(_) => ErrorKind::Validation,
            Self::DeltaTable(_)
            | Self::TableNotFound(_)
            | Self::Schema(_)
            | Self::SigningKeyMissing
            | Self::TokenSigning(_)
            | Self::Io(_)
            | Self::Serialization(_)
            | Self::Arrow(_)
            | Self::DataFusion(_)
            | Self::Config(_)
            | Self::ActorUnavailable(_)
            | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Message safe to hand to a caller.
    ///
    /// Internal failures collapse to a fixed text; the detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<deltalake::DeltaTableError> for CookbookError {
    fn from(err: deltalake::DeltaTableError) -> Self {
        CookbookError::DeltaTable(err.to_string())
    }
}

impl From<deltalake::arrow::error::ArrowError> for CookbookError {
    fn from(err: deltalake::arrow::error::ArrowError) -> Self {
        CookbookError::Arrow(err.to_string())
    }
}

impl From<serde_json::Error> for CookbookError {
    fn from(err: serde_json::Error) -> Self {
        CookbookError::Serialization(err.to_string())
    }
}

impl From<deltalake::datafusion::error::DataFusionError> for CookbookError {
    fn from(err: deltalake::datafusion::error::DataFusionError) -> Self {
        CookbookError::DataFusion(err.to_string())
    }
}

impl From<url::ParseError> for CookbookError {
    fn from(err: url::ParseError) -> Self {
        CookbookError::Config(format!("URL parse error: {err}"))
    }
}

impl From<tokio::task::JoinError> for CookbookError {
    fn from(err: tokio::task::JoinError) -> Self {
        CookbookError::Internal(format!("blocking task failed: {err}"))
    }
}

/// Result type alias for cookbook operations
pub type Result<T> = std::result::Result<T, CookbookError>;
