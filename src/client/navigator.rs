//! Page navigation through the route guard.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    header::{COOKIE, LOCATION},
    redirect::Policy,
    StatusCode,
};
use std::sync::{Mutex, PoisonError};
use tracing::debug;
use url::Url;

use super::{error::ClientError, jar::CookieJar};

const MAX_REDIRECTS: usize = 10;

#[async_trait]
pub trait Navigator: Send + Sync {
    /// Load `path`, letting the server decide where we end up.
    ///
    /// # Errors
    /// Returns an error if the page could not be loaded.
    async fn navigate(&self, path: &str) -> Result<(), ClientError>;

    /// Load the current location again so the guard re-evaluates it.
    ///
    /// # Errors
    /// Returns an error if the page could not be loaded.
    async fn reload(&self) -> Result<(), ClientError>;

    /// Path of the page currently shown.
    fn location(&self) -> String;
}

/// Plain GETs with the shared jar; guard redirects are followed by hand so
/// cookies set along the way are kept.
#[derive(Debug)]
pub struct HttpNavigator {
    client: reqwest::Client,
    base_url: Url,
    jar: CookieJar,
    location: Mutex<String>,
    status: Mutex<Option<StatusCode>>,
}

impl HttpNavigator {
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str, jar: CookieJar) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .redirect(Policy::none())
            .build()?;
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            jar,
            location: Mutex::new("/".to_string()),
            status: Mutex::new(None),
        })
    }

    /// Status of the last page that was actually rendered.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_page(&self, path: String, status: StatusCode) {
        *self.location.lock().unwrap_or_else(PoisonError::into_inner) = path;
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = Some(status);
    }
}

#[async_trait]
impl Navigator for HttpNavigator {
    async fn navigate(&self, path: &str) -> Result<(), ClientError> {
        let mut url = self.base_url.join(path)?;

        for _ in 0..=MAX_REDIRECTS {
            let mut request = self.client.get(url.clone());
            if let Some(cookies) = self.jar.header(Utc::now()) {
                request = request.header(COOKIE, cookies);
            }
            let response = request.send().await?;
            self.jar
                .store_response_cookies(response.headers(), Utc::now());

            let status = response.status();
            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .ok_or(ClientError::MissingLocation)?;
                debug!(from = url.path(), to = location, %status, "redirected");
                url = url.join(location)?;
                continue;
            }

            self.set_page(url.path().to_string(), status);
            return Ok(());
        }

        Err(ClientError::TooManyRedirects(path.to_string()))
    }

    async fn reload(&self) -> Result<(), ClientError> {
        let current = self.location();
        self.navigate(&current).await
    }

    fn location(&self) -> String {
        self.location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
