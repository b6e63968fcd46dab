//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to an [`Action`]. Auth configuration is checked
//! here so a missing administrator or a bad TTL fails before anything binds.

use crate::api::handlers::auth::{AuthConfig, AuthorityMode, CookieStrategy, CredentialStore};
use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{auth, ARG_PORT, ARG_PUBLIC_URL};
use anyhow::Result;
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if the administrator credentials are missing or the session
/// settings are inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let public_url = matches
        .get_one::<String>(ARG_PUBLIC_URL)
        .cloned()
        .unwrap_or_else(|| "http://localhost:8080".to_string());

    let auth_opts = auth::Options::parse(matches);

    let credentials = CredentialStore::new(
        auth_opts.admin_username,
        auth_opts.admin_password.map(SecretString::from),
    )?;

    let auth_config = AuthConfig::new(public_url)
        .with_session_ttl_seconds(auth_opts.session_ttl_seconds)
        .with_cookie_strategy(auth_opts.session_cookies.parse::<CookieStrategy>()?);
    auth_config.validate()?;

    let authority_mode = auth_opts.session_token.parse::<AuthorityMode>()?;

    Ok(Action::Server(Args {
        port,
        auth_config,
        credentials,
        authority_mode,
        session_secret: auth_opts.session_secret.map(SecretString::from),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN_ENV: [(&str, Option<&str>); 6] = [
        ("WARDEN_ADMIN_USERNAME", None),
        ("WARDEN_ADMIN_PASSWORD", None),
        ("WARDEN_SESSION_TTL_SECONDS", None),
        ("WARDEN_SESSION_COOKIES", None),
        ("WARDEN_SESSION_TOKEN", None),
        ("WARDEN_SESSION_SECRET", None),
    ];

    #[test]
    fn admin_username_required() {
        temp_env::with_vars(CLEAN_ENV, || {
            let command = crate::cli::commands::new();
            let matches = command.get_matches_from(vec!["warden", "--admin-password", "s3cr3t"]);
            let result = handler(&matches);
            assert!(result.is_err());
            if let Err(err) = result {
                assert!(err
                    .to_string()
                    .contains("missing required configuration: --admin-username"));
            }
        });
    }

    #[test]
    fn blank_admin_password_is_missing() {
        temp_env::with_vars(CLEAN_ENV, || {
            let command = crate::cli::commands::new();
            let matches = command.get_matches_from(vec![
                "warden",
                "--admin-username",
                "admin",
                "--admin-password",
                "  ",
            ]);
            let result = handler(&matches);
            assert!(result.is_err());
            if let Err(err) = result {
                assert!(err
                    .to_string()
                    .contains("missing required configuration: --admin-password"));
            }
        });
    }

    #[test]
    fn non_positive_ttl_rejected() {
        temp_env::with_vars(CLEAN_ENV, || {
            let command = crate::cli::commands::new();
            let matches = command.get_matches_from(vec![
                "warden",
                "--admin-username",
                "admin",
                "--admin-password",
                "s3cr3t",
                "--session-ttl-seconds",
                "0",
            ]);
            assert!(handler(&matches).is_err());
        });
    }

    #[test]
    fn builds_server_action() {
        temp_env::with_vars(CLEAN_ENV, || {
            let command = crate::cli::commands::new();
            let matches = command.get_matches_from(vec![
                "warden",
                "--port",
                "9000",
                "--public-url",
                "https://admin.example.com",
                "--admin-username",
                "admin",
                "--admin-password",
                "s3cr3t",
                "--session-cookies",
                "single",
                "--session-token",
                "flag",
            ]);
            let Ok(Action::Server(args)) = handler(&matches) else {
                panic!("expected a server action");
            };
            assert_eq!(args.port, 9000);
            assert_eq!(args.credentials.username(), "admin");
            assert!(args.auth_config.session_cookie_secure());
            assert_eq!(args.auth_config.cookie_strategy(), CookieStrategy::Single);
            assert_eq!(args.authority_mode, AuthorityMode::Flag);
            assert!(args.session_secret.is_none());
        });
    }
}
