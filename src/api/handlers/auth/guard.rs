//! Route guard evaluated before any page handler.
//!
//! Flow Overview: classify the path, read the authority cookie, then allow the
//! request or answer with a `307` redirect. The decision is a pure function of
//! the path, the cookie and the clock; no credentials are checked here and no
//! state is written.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use super::{session::is_authenticated, state::AuthState};

pub const LOGIN_PATH: &str = "/";
pub const DASHBOARD_PATH: &str = "/dashboard";

const BYPASS_PREFIXES: &[&str] = &["/api/", "/static/", "/assets/", "/public/"];
const BYPASS_PATHS: &[&str] = &["/health", "/favicon.ico", "/robots.txt"];

/// Path classes the guard distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Surface {
    Login,
    Protected,
    NotFound,
    /// Static assets, API calls and health checks.
    Bypass,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

#[must_use]
pub fn classify(path: &str) -> Surface {
    if path == LOGIN_PATH {
        Surface::Login
    } else if path == DASHBOARD_PATH
        || path
            .strip_prefix(DASHBOARD_PATH)
            .is_some_and(|rest| rest.starts_with('/'))
    {
        Surface::Protected
    } else if BYPASS_PATHS.contains(&path)
        || BYPASS_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
    {
        Surface::Bypass
    } else {
        Surface::NotFound
    }
}

#[must_use]
pub fn decide(surface: Surface, authenticated: bool) -> GuardDecision {
    match (surface, authenticated) {
        (Surface::Bypass, _) | (Surface::Login, false) | (Surface::Protected, true) => {
            GuardDecision::Allow
        }
        (Surface::Login | Surface::NotFound, true) => GuardDecision::Redirect(DASHBOARD_PATH),
        (Surface::Protected | Surface::NotFound, false) => GuardDecision::Redirect(LOGIN_PATH),
    }
}

/// axum middleware wrapping the whole router.
pub async fn route_guard(
    State(auth_state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let surface = classify(request.uri().path());
    if surface == Surface::Bypass {
        return next.run(request).await;
    }

    let authenticated = is_authenticated(&auth_state, request.headers(), Utc::now());
    match decide(surface, authenticated) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(target) => {
            debug!(
                path = request.uri().path(),
                ?surface,
                authenticated,
                target,
                "Route guard redirect"
            );
            Redirect::temporary(target).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_paths() {
        assert_eq!(classify("/"), Surface::Login);
        assert_eq!(classify("/dashboard"), Surface::Protected);
        assert_eq!(classify("/dashboard/"), Surface::Protected);
        assert_eq!(classify("/dashboard/settings"), Surface::Protected);
        assert_eq!(classify("/dashboards"), Surface::NotFound);
        assert_eq!(classify("/404"), Surface::NotFound);
        assert_eq!(classify("/nope/deeper"), Surface::NotFound);
        assert_eq!(classify("/api/auth/login"), Surface::Bypass);
        assert_eq!(classify("/static/app.css"), Surface::Bypass);
        assert_eq!(classify("/favicon.ico"), Surface::Bypass);
        assert_eq!(classify("/health"), Surface::Bypass);
    }

    #[test]
    fn decision_table() {
        let cases = [
            (Surface::Login, false, GuardDecision::Allow),
            (Surface::Login, true, GuardDecision::Redirect("/dashboard")),
            (Surface::Protected, false, GuardDecision::Redirect("/")),
            (Surface::Protected, true, GuardDecision::Allow),
            (Surface::NotFound, false, GuardDecision::Redirect("/")),
            (Surface::NotFound, true, GuardDecision::Redirect("/dashboard")),
            (Surface::Bypass, false, GuardDecision::Allow),
            (Surface::Bypass, true, GuardDecision::Allow),
        ];
        for (surface, authenticated, expected) in cases {
            assert_eq!(
                decide(surface, authenticated),
                expected,
                "{surface:?} authenticated={authenticated}"
            );
        }
    }
}
