// rest_api/src/errors.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lib::StorageError;
use models::ValidationError;
use security::AuthError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors a handler may return. Each variant maps to one HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    /// Logged server-side; the client only sees a generic message.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{} not found", what))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => msg,
            ApiError::Internal(detail) => {
                error!("Request failed: {}", detail);
                "Internal server error".to_string()
            }
        };

        let body = Json(json!({
            "status": "error",
            "message": message,
            "detail": message,
        }));

        (status, body).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::ExpiredToken => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::PasswordHashError(_) | AuthError::JwtError(_) => ApiError::Internal(err.to_string()),
        }
    }
}

/// `AlreadyExists` becomes a bare conflict; handlers that know which
/// uniqueness rule tripped replace the message with their own.
impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AlreadyExists(what) => ApiError::Conflict(format!("{} already exists", what)),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Maps a uniqueness failure to `message`, everything else as usual.
pub fn conflict_as(err: StorageError, message: &str) -> ApiError {
    match err {
        StorageError::AlreadyExists(_) => ApiError::Conflict(message.to_string()),
        other => other.into(),
    }
}
