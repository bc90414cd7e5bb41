//! Per-request user identity.
//!
//! Login, registration and token verification happen upstream. By the time
//! a request reaches this service, the identity layer has stamped it with
//! `x-user-id` (and optionally `x-user-name`). Handlers build a [`Session`]
//! from those headers and pass it explicitly to the operations that need it.

use axum::http::HeaderMap;

use crate::error::AlertError;
use crate::model::ANONYMOUS_USER_NAME;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub user_name: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
        }
    }

    /// Read the session from request headers, if one is present.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let user_id = header_value(headers, USER_ID_HEADER)?;
        let user_name = header_value(headers, USER_NAME_HEADER)
            .unwrap_or_else(|| ANONYMOUS_USER_NAME.to_string());

        Some(Self { user_id, user_name })
    }

    /// Like [`Session::from_headers`], failing with `Unauthenticated`.
    pub fn require(headers: &HeaderMap) -> Result<Self, AlertError> {
        Self::from_headers(headers).ok_or(AlertError::Unauthenticated)
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
