//! A minimal browser cookie jar.
//!
//! One jar stands for one browser: every tab (every [`ClientAuthState`]) built
//! on the same jar sees the same cookies. Only the attributes the dashboard
//! actually emits are honoured: `Max-Age` and `HttpOnly`. Domain and path
//! scoping are ignored since everything lives under `/` on one origin.
//!
//! [`ClientAuthState`]: super::ClientAuthState

use chrono::{DateTime, Duration, Utc};
use cookie::Cookie;
use reqwest::header::{HeaderMap, SET_COOKIE};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::trace;

use crate::api::handlers::auth::MAX_SESSION_TTL_SECONDS;

#[derive(Clone, Debug)]
struct StoredCookie {
    value: String,
    http_only: bool,
    expires_at: Option<DateTime<Utc>>,
}

impl StoredCookie {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |expires_at| now < expires_at)
    }
}

#[derive(Clone, Debug, Default)]
pub struct CookieJar {
    cookies: Arc<Mutex<BTreeMap<String, StoredCookie>>>,
}

impl CookieJar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, StoredCookie>> {
        self.cookies.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply every `Set-Cookie` header of a response.
    pub fn store_response_cookies(&self, headers: &HeaderMap, now: DateTime<Utc>) {
        for value in headers.get_all(SET_COOKIE) {
            if let Ok(set_cookie) = value.to_str() {
                self.store(set_cookie, now);
            }
        }
    }

    /// Apply a single `Set-Cookie` value. `Max-Age` of zero or less deletes;
    /// larger values are capped like a browser would.
    pub fn store(&self, set_cookie: &str, now: DateTime<Utc>) {
        let Ok(cookie) = Cookie::parse(set_cookie) else {
            return;
        };
        let name = cookie.name().trim();
        if name.is_empty() {
            return;
        }

        let http_only = cookie.http_only().unwrap_or(false);
        let max_age = cookie
            .max_age()
            .map(|age| age.whole_seconds().min(MAX_SESSION_TTL_SECONDS));

        let mut cookies = self.lock();
        match max_age {
            Some(seconds) if seconds <= 0 => {
                trace!(cookie = name, "cookie removed");
                cookies.remove(name);
            }
            _ => {
                trace!(cookie = name, http_only, "cookie stored");
                cookies.insert(
                    name.to_string(),
                    StoredCookie {
                        value: cookie.value().trim().to_string(),
                        http_only,
                        expires_at: max_age.and_then(|seconds| {
                            Duration::try_seconds(seconds)
                                .and_then(|age| now.checked_add_signed(age))
                        }),
                    },
                );
            }
        }
    }

    /// Value for a `Cookie` request header, `None` when nothing is live.
    #[must_use]
    pub fn header(&self, now: DateTime<Utc>) -> Option<String> {
        let mut cookies = self.lock();
        cookies.retain(|_, cookie| cookie.is_live(now));
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|(name, cookie)| format!("{name}={}", cookie.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// What page script could read: `HttpOnly` and expired cookies are invisible.
    #[must_use]
    pub fn script_value(&self, name: &str, now: DateTime<Utc>) -> Option<String> {
        let cookies = self.lock();
        cookies
            .get(name)
            .filter(|cookie| !cookie.http_only && cookie.is_live(now))
            .map(|cookie| cookie.value.clone())
    }

    /// Whether a live cookie with this name exists, readable or not.
    #[must_use]
    pub fn contains(&self, name: &str, now: DateTime<Utc>) -> bool {
        self.lock().get(name).is_some_and(|cookie| cookie.is_live(now))
    }
}
