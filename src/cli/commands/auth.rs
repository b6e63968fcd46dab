use clap::{Arg, Command};

pub const ARG_ADMIN_USERNAME: &str = "admin-username";
pub const ARG_ADMIN_PASSWORD: &str = "admin-password";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_SESSION_COOKIES: &str = "session-cookies";
pub const ARG_SESSION_TOKEN: &str = "session-token";
pub const ARG_SESSION_SECRET: &str = "session-secret";

/// Parsed auth options, validated later when the auth state is built.
#[derive(Debug)]
pub struct Options {
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub session_ttl_seconds: i64,
    pub session_cookies: String,
    pub session_token: String,
    pub session_secret: Option<String>,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &clap::ArgMatches) -> Self {
        Self {
            admin_username: matches.get_one::<String>(ARG_ADMIN_USERNAME).cloned(),
            admin_password: matches.get_one::<String>(ARG_ADMIN_PASSWORD).cloned(),
            session_ttl_seconds: matches
                .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
                .copied()
                .unwrap_or(3600),
            session_cookies: matches
                .get_one::<String>(ARG_SESSION_COOKIES)
                .cloned()
                .unwrap_or_else(|| "split".to_string()),
            session_token: matches
                .get_one::<String>(ARG_SESSION_TOKEN)
                .cloned()
                .unwrap_or_else(|| "signed".to_string()),
            session_secret: matches.get_one::<String>(ARG_SESSION_SECRET).cloned(),
        }
    }
}

pub fn with_args(command: Command) -> Command {
    let command = with_admin_args(command);
    with_session_args(command)
}

fn with_admin_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ADMIN_USERNAME)
                .long(ARG_ADMIN_USERNAME)
                .help("Administrator username")
                .env("WARDEN_ADMIN_USERNAME"),
        )
        .arg(
            Arg::new(ARG_ADMIN_PASSWORD)
                .long(ARG_ADMIN_PASSWORD)
                .help("Administrator password")
                .env("WARDEN_ADMIN_PASSWORD")
                .hide_env_values(true),
        )
}

fn with_session_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session cookie TTL in seconds")
                .env("WARDEN_SESSION_TTL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIES)
                .long(ARG_SESSION_COOKIES)
                .help("Cookies issued per session: single (authority only) or split (authority + display)")
                .env("WARDEN_SESSION_COOKIES")
                .default_value("split")
                .value_parser(["single", "split"]),
        )
        .arg(
            Arg::new(ARG_SESSION_TOKEN)
                .long(ARG_SESSION_TOKEN)
                .help("Authority cookie value: flag (bare marker) or signed (HMAC token with expiry)")
                .env("WARDEN_SESSION_TOKEN")
                .default_value("signed")
                .value_parser(["flag", "signed"]),
        )
        .arg(
            Arg::new(ARG_SESSION_SECRET)
                .long(ARG_SESSION_SECRET)
                .help("HMAC secret for signed session tokens, at least 32 bytes (random per process if unset)")
                .env("WARDEN_SESSION_SECRET")
                .hide_env_values(true),
        )
}
