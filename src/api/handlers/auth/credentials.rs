//! The single administrator identity and its verifier.
//!
//! Loaded once at startup and never mutated. Comparison is constant time over
//! both fields so a mismatch on the username costs the same as one on the
//! password.

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use super::error::AuthError;

#[derive(Clone)]
pub struct CredentialStore {
    username: String,
    password: SecretString,
}

impl CredentialStore {
    /// Build the store from configured values.
    ///
    /// # Errors
    /// Returns [`AuthError::MissingConfiguration`] when either value is absent or blank.
    pub fn new(
        username: Option<String>,
        password: Option<SecretString>,
    ) -> Result<Self, AuthError> {
        let username = username
            .filter(|value| !value.trim().is_empty())
            .ok_or(AuthError::MissingConfiguration("--admin-username"))?;
        let password = password
            .filter(|value| !value.expose_secret().trim().is_empty())
            .ok_or(AuthError::MissingConfiguration("--admin-password"))?;

        Ok(Self { username, password })
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Compare submitted credentials against the configured pair.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidCredentials`] when either field differs.
    pub fn verify(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let username_ok = username.as_bytes().ct_eq(self.username.as_bytes());
        let password_ok = password
            .as_bytes()
            .ct_eq(self.password.expose_secret().as_bytes());

        if bool::from(username_ok & password_ok) {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Result<CredentialStore, AuthError> {
        CredentialStore::new(
            Some("admin".to_string()),
            Some(SecretString::from("s3cr3t".to_string())),
        )
    }

    #[test]
    fn verify_accepts_configured_pair() -> Result<(), AuthError> {
        store()?.verify("admin", "s3cr3t")
    }

    #[test]
    fn verify_rejects_either_field_with_same_error() -> Result<(), AuthError> {
        let store = store()?;
        for (username, password) in [
            ("admin", "wrong"),
            ("root", "s3cr3t"),
            ("", ""),
            ("admin", "s3cr3t "),
            ("Admin", "s3cr3t"),
        ] {
            let err = store.verify(username, password);
            assert!(matches!(err, Err(AuthError::InvalidCredentials)));
            if let Err(err) = err {
                assert_eq!(err.to_string(), "Invalid credentials");
            }
        }
        Ok(())
    }

    #[test]
    fn missing_username_fails_fast() {
        let result =
            CredentialStore::new(None, Some(SecretString::from("s3cr3t".to_string())));
        assert!(matches!(
            result,
            Err(AuthError::MissingConfiguration("--admin-username"))
        ));
    }

    #[test]
    fn blank_password_fails_fast() {
        let result = CredentialStore::new(
            Some("admin".to_string()),
            Some(SecretString::from("  ".to_string())),
        );
        assert!(matches!(
            result,
            Err(AuthError::MissingConfiguration("--admin-password"))
        ));
    }

    #[test]
    fn debug_redacts_password() -> Result<(), AuthError> {
        let rendered = format!("{:?}", store()?);
        assert!(!rendered.contains("s3cr3t"));
        Ok(())
    }
}
