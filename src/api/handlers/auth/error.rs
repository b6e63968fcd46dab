//! Error kinds surfaced by the auth subsystem.

use axum::{
    http::{header::InvalidHeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::types::LoginResponse;

/// Generic message returned for any credential mismatch.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password did not match. Never says which one.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Required configuration is absent; fatal at startup.
    #[error("missing required configuration: {0}")]
    MissingConfiguration(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Session cookies could not be cleared.
    #[error("failed to clear session cookies: {0}")]
    TeardownFailure(String),

    #[error("failed to encode session cookie: {0}")]
    Cookie(#[from] InvalidHeaderValue),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(LoginResponse::failure(INVALID_CREDENTIALS_MESSAGE)),
            )
                .into_response(),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(LoginResponse::failure("Authentication failed")),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_credentials_maps_to_unauthorized() {
        let response = AuthError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn teardown_failure_is_internal_error() {
        let response = AuthError::TeardownFailure("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_configuration_names_the_field() {
        let err = AuthError::MissingConfiguration("--admin-password");
        assert_eq!(
            err.to_string(),
            "missing required configuration: --admin-password"
        );
    }
}
