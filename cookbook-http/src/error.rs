//! HTTP error responses
//!
//! Every failure leaves the server as
//! `{ "success": false, "statusCode": <u16>, "message": <string> }`.
//! Internal errors are logged in full and answered with a generic message.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cookbook_lakehouse::{CookbookError, ErrorKind};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub status_code: u16,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                success: false,
                status_code: status.as_u16(),
                message: message.into(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(detail: &str) -> Self {
        tracing::error!(detail, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<CookbookError> for ApiError {
    fn from(err: CookbookError) -> Self {
        let kind = err.kind();
        if kind == ErrorKind::Internal {
            tracing::error!(error = %err, "cookbook operation failed");
        } else {
            tracing::debug!(error = %err, kind = %kind, "request rejected");
        }
        let status = StatusCode::from_u16(kind.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.public_message())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_maps_to_status() {
        let cases = [
            (CookbookError::IdentityNotFound("x".into()), 404),
            (CookbookError::IdentityAlreadyExists("a@b".into()), 409),
            (CookbookError::InvalidCredentials, 401),
            (CookbookError::Forbidden("no".into()), 403),
            (CookbookError::Validation("bad".into()), 400),
            (CookbookError::DeltaTable("disk on fire".into()), 500),
        ];
        for (err, status) in cases {
            let api = ApiError::from(err);
            assert_eq!(api.status.as_u16(), status);
            assert_eq!(api.body.status_code, status);
            assert!(!api.body.success);
        }
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let api = ApiError::from(CookbookError::DeltaTable("s3://secret-bucket".into()));
        assert_eq!(api.body.message, "Internal server error");
    }
}
