//! Auth state and configuration.

use std::str::FromStr;

use super::{credentials::CredentialStore, error::AuthError, token::AuthorityCodec};

const DEFAULT_SESSION_TTL_SECONDS: i64 = 60 * 60;
const DEFAULT_PUBLIC_URL: &str = "http://localhost:8080";
// Browsers cap cookie lifetimes at 400 days.
pub const MAX_SESSION_TTL_SECONDS: i64 = 400 * 24 * 60 * 60;

/// Which cookies a session is materialized as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CookieStrategy {
    /// Authority cookie only.
    Single,
    /// Authority cookie plus the script-readable display cookie.
    Split,
}

impl FromStr for CookieStrategy {
    type Err = AuthError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "split" => Ok(Self::Split),
            other => Err(AuthError::InvalidConfiguration(format!(
                "unknown session cookie strategy: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    public_url: String,
    session_ttl_seconds: i64,
    cookie_strategy: CookieStrategy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_URL.to_string())
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new(public_url: String) -> Self {
        Self {
            public_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            cookie_strategy: CookieStrategy::Split,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_cookie_strategy(mut self, strategy: CookieStrategy) -> Self {
        self.cookie_strategy = strategy;
        self
    }

    /// # Errors
    /// Returns [`AuthError::InvalidConfiguration`] for a TTL outside 1s..=400 days.
    pub fn validate(&self) -> Result<(), AuthError> {
        if !(1..=MAX_SESSION_TTL_SECONDS).contains(&self.session_ttl_seconds) {
            return Err(AuthError::InvalidConfiguration(format!(
                "session TTL must be between 1 and {MAX_SESSION_TTL_SECONDS} seconds, got {}",
                self.session_ttl_seconds
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn cookie_strategy(&self) -> CookieStrategy {
        self.cookie_strategy
    }

    /// Only mark cookies secure when the dashboard is served over HTTPS.
    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.public_url.starts_with("https://")
    }
}

/// Everything the auth handlers and the route guard share. Immutable after startup.
#[derive(Debug)]
pub struct AuthState {
    config: AuthConfig,
    credentials: CredentialStore,
    codec: AuthorityCodec,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, credentials: CredentialStore, codec: AuthorityCodec) -> Self {
        Self {
            config,
            credentials,
            codec,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    #[must_use]
    pub fn codec(&self) -> &AuthorityCodec {
        &self.codec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_one_hour_split_cookies() {
        let config = AuthConfig::default();
        assert_eq!(config.session_ttl_seconds(), 3600);
        assert_eq!(config.cookie_strategy(), CookieStrategy::Split);
        assert!(!config.session_cookie_secure());
    }

    #[test]
    fn https_public_url_marks_cookies_secure() {
        let config = AuthConfig::new("https://admin.example.com".to_string());
        assert!(config.session_cookie_secure());
    }

    #[test]
    fn validate_rejects_out_of_range_ttl() {
        for ttl in [0, -5, i64::MAX] {
            let config = AuthConfig::default().with_session_ttl_seconds(ttl);
            assert!(matches!(
                config.validate(),
                Err(AuthError::InvalidConfiguration(_))
            ));
        }
        assert!(AuthConfig::default()
            .with_session_ttl_seconds(86_400)
            .validate()
            .is_ok());
    }

    #[test]
    fn cookie_strategy_parses() {
        assert_eq!("single".parse::<CookieStrategy>().ok(), Some(CookieStrategy::Single));
        assert_eq!(" SPLIT ".parse::<CookieStrategy>().ok(), Some(CookieStrategy::Split));
        assert!("both".parse::<CookieStrategy>().is_err());
    }
}
