//! Error types for the alert store and the HTTP layer.
//!
//! The query engine itself never fails; these errors come from its
//! collaborators (storage, session, request validation).

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("alert {0} not found")]
    NotFound(i64),

    /// The caller is not the alert's owner.
    #[error("alert {0} belongs to another user")]
    Forbidden(i64),

    #[error("a user session is required")]
    Unauthenticated,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The request body, query string or path could not be extracted.
    #[error("invalid request: {message}")]
    InvalidRequest { status: StatusCode, message: String },
}

macro_rules! impl_from_rejection {
    ($($rejection:ty),*) => {
        $(
            impl From<$rejection> for AlertError {
                fn from(rejection: $rejection) -> Self {
                    AlertError::InvalidRequest {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    }
                }
            }
        )*
    };
}

impl_from_rejection!(JsonRejection, QueryRejection, PathRejection);

impl AlertError {
    pub fn validation(message: impl Into<String>) -> Self {
        AlertError::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AlertError::Validation(_) => StatusCode::BAD_REQUEST,
            AlertError::NotFound(_) => StatusCode::NOT_FOUND,
            AlertError::Forbidden(_) => StatusCode::FORBIDDEN,
            AlertError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AlertError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AlertError::InvalidRequest { status, .. } => *status,
        }
    }
}

impl IntoResponse for AlertError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Database details stay in the logs.
        let message = match &self {
            AlertError::Database(_) => "internal error".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
