use crate::api::{
    self,
    handlers::auth::{
        AuthConfig, AuthState, AuthorityCodec, AuthorityMode, CredentialStore, SessionKey,
    },
};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub auth_config: AuthConfig,
    pub credentials: CredentialStore,
    pub authority_mode: AuthorityMode,
    pub session_secret: Option<SecretString>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the session key is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let codec = match args.authority_mode {
        AuthorityMode::Flag => {
            warn!("Session token mode is 'flag': the authority cookie is not signed");
            AuthorityCodec::Flag
        }
        AuthorityMode::Signed => {
            let key = if let Some(secret) = &args.session_secret {
                SessionKey::new(secret.expose_secret().as_bytes())
                    .context("invalid --session-secret")?
            } else {
                warn!("No session secret configured; sessions will not survive a restart");
                SessionKey::generate()?
            };
            AuthorityCodec::Signed(key)
        }
    };

    let auth_state = Arc::new(AuthState::new(args.auth_config, args.credentials, codec));

    api::new(args.port, auth_state).await
}

fn log_startup_args(args: &Args) {
    info!(
        port = args.port,
        public_url = args.auth_config.public_url(),
        admin = args.credentials.username(),
        session_ttl_seconds = args.auth_config.session_ttl_seconds(),
        cookie_strategy = ?args.auth_config.cookie_strategy(),
        authority_mode = ?args.authority_mode,
        "Starting warden"
    );
}
