//! API error type and the uniform response envelope.
//!
//! Handlers return `Result<_, ApiError>`; the `IntoResponse` impl maps each
//! variant to a status code and a JSON envelope. Internal failures are
//! logged server-side and surfaced to the client as an opaque message.

use auth_session::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    /// Log the underlying failure and hide it behind an opaque 500.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        tracing::error!("internal error: {}", err);
        ApiError::Internal
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(message) => ApiError::Validation(message),
            AuthError::EmailAlreadyInUse => {
                ApiError::validation("`email` is already in use")
            }
            // Every credential and token failure collapses into one 401.
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::InvalidRefreshToken
            | AuthError::SessionInvalidated => ApiError::Unauthorized,
            AuthError::UserNotFound => ApiError::not_found("user not found"),
            AuthError::RefreshTokenNotFound
            | AuthError::Hashing
            | AuthError::Signing(_)
            | AuthError::Database(_) => ApiError::internal(err),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::internal(err)
    }
}

impl From<database_layer::DatabaseError> for ApiError {
    fn from(err: database_layer::DatabaseError) -> Self {
        ApiError::internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.to_string()),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

/// Uniform response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn api_success<T>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data: Some(data),
        error: None,
    }
}

/// Bare `{"success": true}` acknowledgement.
pub fn api_ok() -> ApiResponse<()> {
    ApiResponse {
        success: true,
        data: None,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_map_to_401() {
        for err in [
            AuthError::InvalidCredentials,
            AuthError::InvalidToken,
            AuthError::InvalidRefreshToken,
            AuthError::SessionInvalidated,
        ] {
            assert!(matches!(ApiError::from(err), ApiError::Unauthorized));
        }
    }

    #[test]
    fn internal_failures_stay_opaque() {
        let err = ApiError::from(AuthError::Signing("key went missing".to_string()));
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn envelope_omits_empty_fields() {
        let json = serde_json::to_value(api_ok()).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true }));
    }
}
