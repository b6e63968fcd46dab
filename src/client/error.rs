use reqwest::StatusCode;
use thiserror::Error;

/// Message shown when a login attempt fails for any reason other than a
/// credential rejection.
pub const LOGIN_FAILED_MESSAGE: &str = "Authentication failed. Please try again.";

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered and refused the credentials.
    #[error("{0}")]
    Rejected(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("unexpected status {0}")]
    UnexpectedStatus(StatusCode),

    #[error("redirect without a usable Location header")]
    MissingLocation,

    #[error("too many redirects starting at {0}")]
    TooManyRedirects(String),
}

impl ClientError {
    /// Text safe to put in front of a user.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Rejected(message) => message,
            _ => LOGIN_FAILED_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_message_passes_through() {
        let err = ClientError::Rejected("Invalid credentials".to_string());
        assert_eq!(err.user_message(), "Invalid credentials");
    }

    #[test]
    fn other_failures_use_generic_message() {
        let err = ClientError::UnexpectedStatus(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), LOGIN_FAILED_MESSAGE);
        assert_eq!(ClientError::MissingLocation.user_message(), LOGIN_FAILED_MESSAGE);
    }
}
