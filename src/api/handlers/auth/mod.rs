//! Auth handlers and supporting modules.
//!
//! This module covers the whole trust boundary of the dashboard: the configured
//! administrator ([`CredentialStore`]), session issuance and teardown
//! ([`session`]), the authority cookie encoding ([`token`]) and the request
//! guard ([`guard`]).
//!
//! ## Session cookies
//!
//! - `warden_session`: `HttpOnly`, `SameSite=Lax`, `Path=/`, fixed `Max-Age`,
//!   `Secure` when the public URL is HTTPS. The only authorization input.
//! - `warden_user`: same attributes minus `HttpOnly`, URL-encoded JSON
//!   `{"username": ...}`. Only issued with the `split` cookie strategy.
//!
//! There is no sliding expiration, no session table and no revocation list.
//! Logging in again overwrites both cookies with a fresh session id.

mod credentials;
mod error;
pub mod guard;
pub mod session;
mod state;
pub mod token;
pub mod types;

pub use credentials::CredentialStore;
pub use error::{AuthError, INVALID_CREDENTIALS_MESSAGE};
pub use session::{AUTHORITY_COOKIE_NAME, DISPLAY_COOKIE_NAME};
pub use state::{AuthConfig, AuthState, CookieStrategy, MAX_SESSION_TTL_SECONDS};
pub use token::{AuthorityCodec, AuthorityMode, SessionKey};
