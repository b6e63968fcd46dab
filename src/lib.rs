//! # Warden (admin dashboard authentication)
//!
//! `warden` verifies a single configured administrator, issues the session
//! cookies for that administrator, and gates every incoming request on the
//! authority cookie before any dashboard content is served.
//!
//! ## Session model
//!
//! There is no server-side session table. A session lives entirely in cookies:
//!
//! - **Authority cookie** (`warden_session`, `HttpOnly`): the only input the
//!   route guard reads. Holds either the literal `authenticated` flag or a
//!   signed token that embeds its own expiry.
//! - **Display cookie** (`warden_user`, script readable): a `{username}` record
//!   for rendering identity. Never consulted for authorization.
//!
//! Both cookies share one fixed TTL. Activity never extends a session.
//!
//! ## Route guard
//!
//! Every request that is not a static asset or an API call is classified as the
//! login surface (`/`), the protected surface (`/dashboard/**`) or the not-found
//! surface, and is allowed or answered with a `307` redirect. The guard only
//! inspects cookies; it never re-checks credentials.
//!
//! ## Client state
//!
//! [`client::ClientAuthState`] mirrors the session per browsing context and keeps
//! tabs of the same browser in sync over an explicit publish/subscribe channel.

pub mod api;
pub mod cli;
pub mod client;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
