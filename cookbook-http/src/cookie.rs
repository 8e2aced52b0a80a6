//! Session token transport: an `HttpOnly` cookie named `access_token`

use axum::http::{header, HeaderMap, HeaderValue};

use crate::error::ApiError;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Attributes applied to every session cookie
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    /// Adds `Secure`; turn off only for plain-HTTP local development
    pub secure: bool,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self { secure: true }
    }
}

impl CookiePolicy {
    fn attributes(&self) -> &'static str {
        if self.secure {
            "HttpOnly; Secure; SameSite=Strict; Path=/"
        } else {
            "HttpOnly; SameSite=Strict; Path=/"
        }
    }

    pub fn session_cookie(&self, token: &str) -> Result<HeaderValue, ApiError> {
        HeaderValue::from_str(&format!(
            "{ACCESS_TOKEN_COOKIE}={token}; {}",
            self.attributes()
        ))
        .map_err(|_| ApiError::internal("token is not a valid cookie value"))
    }

    pub fn clear_cookie(&self) -> HeaderValue {
        let value = if self.secure {
            "access_token=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; Secure; SameSite=Strict; Path=/"
        } else {
            "access_token=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Strict; Path=/"
        };
        HeaderValue::from_static(value)
    }
}

pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for cookie in headers.get_all(header::COOKIE) {
        let Ok(s) = cookie.to_str() else { continue };
        for part in s.split(';') {
            if let Some((k, v)) = part.trim().split_once('=') {
                if k == name {
                    return Some(v.to_string());
                }
            }
        }
    }
    None
}

/// Token presented by the caller: the session cookie, else a bearer header
pub fn presented_token(headers: &HeaderMap) -> Option<String> {
    parse_cookie(headers, ACCESS_TOKEN_COOKIE)
        .filter(|t| !t.is_empty() && t != "deleted")
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|t| t.trim().to_string())
        })
}
