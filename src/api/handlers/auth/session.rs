//! Session issuance and teardown, plus the cookie-backed auth endpoints.

use axum::{
    extract::Extension,
    http::{
        header::{InvalidHeaderValue, COOKIE, LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{
    error::AuthError,
    state::{AuthConfig, AuthState, CookieStrategy},
    types::{LoginRequest, LoginResponse, SessionResponse},
};

pub const AUTHORITY_COOKIE_NAME: &str = "warden_session";
pub const DISPLAY_COOKIE_NAME: &str = "warden_user";

/// The logical session carried by the cookies. Nothing is stored server-side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// `Set-Cookie` values for a freshly issued session.
#[derive(Debug)]
pub struct SessionCookies {
    pub session: Session,
    pub authority: HeaderValue,
    pub display: Option<HeaderValue>,
}

impl SessionCookies {
    #[must_use]
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, self.authority.clone());
        if let Some(display) = &self.display {
            headers.append(SET_COOKIE, display.clone());
        }
        headers
    }
}

/// Build the cookies for a verified subject. Issuing again simply overwrites
/// the previous cookies in the browser.
///
/// # Errors
/// Returns [`AuthError::Cookie`] if a cookie value cannot be encoded as a header.
pub fn issue(
    auth_state: &AuthState,
    subject: &str,
    now: DateTime<Utc>,
) -> Result<SessionCookies, AuthError> {
    let config = auth_state.config();
    let ttl_seconds = config.session_ttl_seconds();
    let session = Session {
        id: Uuid::new_v4(),
        subject: subject.to_string(),
        issued_at: now,
        expires_at: now + Duration::seconds(ttl_seconds),
    };

    let value = auth_state.codec().issue(session.id, session.expires_at);
    let authority = session_cookie(config, AUTHORITY_COOKIE_NAME, &value, true)?;

    let display = match config.cookie_strategy() {
        CookieStrategy::Single => None,
        CookieStrategy::Split => {
            let identity = json!({ "username": subject }).to_string();
            let encoded = urlencoding::encode(&identity);
            Some(session_cookie(config, DISPLAY_COOKIE_NAME, &encoded, false)?)
        }
    };

    Ok(SessionCookies {
        session,
        authority,
        display,
    })
}

/// Expire both cookies. Safe to call without a session.
///
/// # Errors
/// Returns [`AuthError::TeardownFailure`] if the clearing headers cannot be built.
pub fn teardown(config: &AuthConfig) -> Result<Vec<HeaderValue>, AuthError> {
    [AUTHORITY_COOKIE_NAME, DISPLAY_COOKIE_NAME]
        .into_iter()
        .map(|name| {
            clear_cookie(config, name, name == AUTHORITY_COOKIE_NAME)
                .map_err(|err| AuthError::TeardownFailure(err.to_string()))
        })
        .collect()
}

/// Whether the request carries a valid authority cookie. The display cookie
/// is never consulted.
#[must_use]
pub fn is_authenticated(auth_state: &AuthState, headers: &HeaderMap, now: DateTime<Utc>) -> bool {
    extract_cookie(headers, AUTHORITY_COOKIE_NAME)
        .is_some_and(|value| auth_state.codec().verify(&value, now))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted, session cookies set", body = LoginResponse),
        (status = 400, description = "Missing or malformed credentials", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = LoginResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(LoginResponse::failure("Missing credentials")),
        )
            .into_response();
    };

    if let Err(err) = auth_state
        .credentials()
        .verify(&request.username, &request.password)
    {
        warn!("Login rejected: {err}");
        return err.into_response();
    }

    match issue(&auth_state, &request.username, Utc::now()) {
        Ok(cookies) => {
            info!(
                session_id = %cookies.session.id,
                expires_at = %cookies.session.expires_at,
                "Session issued"
            );
            (
                StatusCode::OK,
                cookies.headers(),
                Json(LoginResponse::success(&request.username)),
            )
                .into_response()
        }
        Err(err) => {
            error!("Failed to issue session: {err}");
            err.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 303, description = "Session cookies cleared, redirect to the login surface")
    ),
    tag = "auth"
)]
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();

    // The redirect happens even if clearing fails; the client drops its state regardless.
    match teardown(auth_state.config()) {
        Ok(cookies) => {
            for cookie in cookies {
                headers.append(SET_COOKIE, cookie);
            }
            debug!("Session cookies cleared");
        }
        Err(err) => error!("{err}"),
    }

    headers.insert(LOCATION, HeaderValue::from_static("/"));
    (StatusCode::SEE_OTHER, headers).into_response()
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn session(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    if !is_authenticated(&auth_state, &headers, Utc::now()) {
        return StatusCode::NO_CONTENT.into_response();
    }

    // Single-subject model: an authenticated session always belongs to the configured admin.
    let response = SessionResponse {
        authenticated: true,
        username: auth_state.credentials().username().to_string(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

fn session_cookie(
    config: &AuthConfig,
    name: &str,
    value: &str,
    http_only: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!("{name}={value}; Path=/");
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    cookie.push_str(&format!("; SameSite=Lax; Max-Age={ttl_seconds}"));
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_cookie(
    config: &AuthConfig,
    name: &str,
    http_only: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}=; Path=/");
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    cookie.push_str("; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Read a cookie value from every `Cookie` header on the request.
pub(crate) fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| val.trim().to_string())
        })
}
