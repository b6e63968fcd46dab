//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoginResponse {
    #[must_use]
    pub fn success(username: &str) -> Self {
        Self {
            success: true,
            username: Some(username.to_string()),
            error: None,
        }
    }

    #[must_use]
    pub fn failure(message: &str) -> Self {
        Self {
            success: false,
            username: None,
            error: Some(message.to_string()),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub username: String,
}

/// Payload of the script-readable display cookie. UI hint only.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DisplayIdentity {
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn login_request_debug_redacts_password() {
        let request = LoginRequest {
            username: "admin".to_string(),
            password: "s3cr3t".to_string(),
        };
        let rendered = format!("{request:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("s3cr3t"));
    }

    #[test]
    fn failure_response_omits_username() -> Result<()> {
        let value = serde_json::to_value(LoginResponse::failure("Invalid credentials"))?;
        assert_eq!(value.get("success"), Some(&serde_json::Value::Bool(false)));
        assert!(value.get("username").is_none());
        let error = value
            .get("error")
            .and_then(serde_json::Value::as_str)
            .context("missing error")?;
        assert_eq!(error, "Invalid credentials");
        Ok(())
    }
}
