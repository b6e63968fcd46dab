//! Authority cookie values.
//!
//! Two encodings share one code path:
//! - `flag`: the literal `authenticated`. Presence of the right value is the
//!   whole proof; expiry is left to the browser.
//! - `signed`: `base64url(v1.<session-id>.<expires-unix>).base64url(hmac)`.
//!   The guard checks the MAC and the embedded expiry, so a replayed cookie is
//!   rejected once its TTL has passed even if the browser kept it.

use anyhow::{Context, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use std::{fmt, str::FromStr, sync::Arc};
use uuid::Uuid;

use super::error::AuthError;

pub(crate) const AUTHENTICATED_FLAG: &str = "authenticated";
const TOKEN_VERSION: &str = "v1";

type HmacSha256 = Hmac<Sha256>;

/// Which authority cookie encoding is in use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthorityMode {
    Flag,
    Signed,
}

impl FromStr for AuthorityMode {
    type Err = AuthError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "flag" => Ok(Self::Flag),
            "signed" => Ok(Self::Signed),
            other => Err(AuthError::InvalidConfiguration(format!(
                "unknown session token mode: {other}"
            ))),
        }
    }
}

/// HMAC key for signed authority tokens.
#[derive(Clone)]
pub struct SessionKey {
    mac: Arc<HmacSha256>,
}

impl SessionKey {
    /// Minimum key length in bytes (256 bits)
    pub const MIN_KEY_LENGTH: usize = 32;

    /// # Errors
    /// Returns [`AuthError::InvalidConfiguration`] if the key is shorter than 32 bytes.
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, AuthError> {
        let key = key.as_ref();
        if key.len() < Self::MIN_KEY_LENGTH {
            return Err(AuthError::InvalidConfiguration(format!(
                "session secret too short: got {} bytes, need at least {}",
                key.len(),
                Self::MIN_KEY_LENGTH
            )));
        }
        let mac = HmacSha256::new_from_slice(key)
            .map_err(|err| AuthError::InvalidConfiguration(err.to_string()))?;
        Ok(Self { mac: Arc::new(mac) })
    }

    /// Random per-process key. Sessions do not survive a restart.
    ///
    /// # Errors
    /// Returns an error if the OS random source fails.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; Self::MIN_KEY_LENGTH];
        OsRng
            .try_fill_bytes(&mut bytes)
            .context("failed to generate session secret")?;
        Ok(Self::new(bytes)?)
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = (*self.mac).clone();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        let mut mac = (*self.mac).clone();
        mac.update(data);
        mac.verify_slice(signature).is_ok()
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey").finish_non_exhaustive()
    }
}

/// Encoder/decoder for the authority cookie value.
#[derive(Clone, Debug)]
pub enum AuthorityCodec {
    Flag,
    Signed(SessionKey),
}

impl AuthorityCodec {
    #[must_use]
    pub fn mode(&self) -> AuthorityMode {
        match self {
            Self::Flag => AuthorityMode::Flag,
            Self::Signed(_) => AuthorityMode::Signed,
        }
    }

    /// Produce the cookie value for a new session.
    #[must_use]
    pub fn issue(&self, session_id: Uuid, expires_at: DateTime<Utc>) -> String {
        match self {
            Self::Flag => AUTHENTICATED_FLAG.to_string(),
            Self::Signed(key) => {
                let payload = format!("{TOKEN_VERSION}.{session_id}.{}", expires_at.timestamp());
                let signature = key.sign(payload.as_bytes());
                format!(
                    "{}.{}",
                    Base64UrlUnpadded::encode_string(payload.as_bytes()),
                    Base64UrlUnpadded::encode_string(&signature)
                )
            }
        }
    }

    /// Whether a presented cookie value proves an unexpired session.
    ///
    /// Never errors: anything malformed is simply not authenticated.
    #[must_use]
    pub fn verify(&self, value: &str, now: DateTime<Utc>) -> bool {
        match self {
            Self::Flag => value == AUTHENTICATED_FLAG,
            Self::Signed(key) => verify_signed(key, value, now),
        }
    }
}

fn verify_signed(key: &SessionKey, value: &str, now: DateTime<Utc>) -> bool {
    let Some((payload_b64, signature_b64)) = value.split_once('.') else {
        return false;
    };
    let (Ok(payload), Ok(signature)) = (
        Base64UrlUnpadded::decode_vec(payload_b64),
        Base64UrlUnpadded::decode_vec(signature_b64),
    ) else {
        return false;
    };
    if !key.verify(&payload, &signature) {
        return false;
    }

    let Ok(payload) = std::str::from_utf8(&payload) else {
        return false;
    };
    let mut parts = payload.splitn(3, '.');
    let (Some(version), Some(session_id), Some(expires_at)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if version != TOKEN_VERSION || Uuid::parse_str(session_id).is_err() {
        return false;
    }

    expires_at
        .parse::<i64>()
        .is_ok_and(|expires_at| now.timestamp() < expires_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn signed() -> Result<AuthorityCodec, AuthError> {
        Ok(AuthorityCodec::Signed(SessionKey::new([7u8; 32])?))
    }

    #[test]
    fn flag_mode_accepts_only_the_flag() {
        let codec = AuthorityCodec::Flag;
        let now = Utc::now();
        let value = codec.issue(Uuid::new_v4(), now + Duration::hours(1));
        assert_eq!(value, AUTHENTICATED_FLAG);
        assert!(codec.verify(&value, now));
        assert!(!codec.verify("true", now));
        assert!(!codec.verify("", now));
    }

    #[test]
    fn signed_token_verifies_until_expiry() -> Result<(), AuthError> {
        let codec = signed()?;
        let now = Utc::now();
        let expires_at = now + Duration::seconds(3600);
        let value = codec.issue(Uuid::new_v4(), expires_at);

        assert!(codec.verify(&value, now));
        assert!(codec.verify(&value, expires_at - Duration::seconds(1)));
        assert!(!codec.verify(&value, expires_at));
        assert!(!codec.verify(&value, expires_at + Duration::seconds(60)));
        Ok(())
    }

    #[test]
    fn signed_token_rejects_other_key() -> Result<(), AuthError> {
        let now = Utc::now();
        let value = signed()?.issue(Uuid::new_v4(), now + Duration::hours(1));
        let other = AuthorityCodec::Signed(SessionKey::new([9u8; 32])?);
        assert!(!other.verify(&value, now));
        Ok(())
    }

    #[test]
    fn signed_token_rejects_extended_expiry() -> Result<(), AuthError> {
        let codec = signed()?;
        let now = Utc::now();
        let value = codec.issue(Uuid::new_v4(), now + Duration::hours(1));
        let Some((_, signature)) = value.split_once('.') else {
            panic!("token has no signature");
        };
        let forged_payload = format!(
            "v1.{}.{}",
            Uuid::new_v4(),
            (now + Duration::days(365)).timestamp()
        );
        let forged = format!(
            "{}.{signature}",
            Base64UrlUnpadded::encode_string(forged_payload.as_bytes())
        );
        assert!(!codec.verify(&forged, now));
        Ok(())
    }

    #[test]
    fn signed_mode_rejects_bare_flag_and_garbage() -> Result<(), AuthError> {
        let codec = signed()?;
        let now = Utc::now();
        assert!(!codec.verify(AUTHENTICATED_FLAG, now));
        assert!(!codec.verify("a.b", now));
        assert!(!codec.verify("", now));
        Ok(())
    }

    #[test]
    fn reissue_rotates_value() -> Result<(), AuthError> {
        let codec = signed()?;
        let expires_at = Utc::now() + Duration::hours(1);
        assert_ne!(
            codec.issue(Uuid::new_v4(), expires_at),
            codec.issue(Uuid::new_v4(), expires_at)
        );
        Ok(())
    }

    #[test]
    fn short_key_is_rejected() {
        assert!(matches!(
            SessionKey::new([1u8; 16]),
            Err(AuthError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn generated_key_signs() -> anyhow::Result<()> {
        let codec = AuthorityCodec::Signed(SessionKey::generate()?);
        let now = Utc::now();
        let value = codec.issue(Uuid::new_v4(), now + Duration::minutes(5));
        assert!(codec.verify(&value, now));
        Ok(())
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Signed".parse::<AuthorityMode>().ok(), Some(AuthorityMode::Signed));
        assert_eq!("flag".parse::<AuthorityMode>().ok(), Some(AuthorityMode::Flag));
        assert!("jwt".parse::<AuthorityMode>().is_err());
    }
}
