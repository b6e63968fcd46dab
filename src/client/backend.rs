//! The server boundary as seen from a browsing context.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header::COOKIE, redirect::Policy, RequestBuilder, Response, StatusCode};
use tracing::debug;
use url::Url;

use super::{error::ClientError, jar::CookieJar};
use crate::api::handlers::auth::types::{LoginRequest, LoginResponse, SessionResponse};

/// Successful login: the server set the session cookies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginGranted {
    pub username: Option<String>,
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// # Errors
    /// [`ClientError::Rejected`] with the server's generic message when the
    /// credentials do not match; any other variant for transport failures.
    async fn login(&self, username: &str, password: &str) -> Result<LoginGranted, ClientError>;

    /// # Errors
    /// Returns an error if the server could not be reached or answered unexpectedly.
    async fn logout(&self) -> Result<(), ClientError>;

    /// Username of the current session, if the authority cookie is accepted.
    ///
    /// # Errors
    /// Returns an error if the server could not be reached or answered unexpectedly.
    async fn session(&self) -> Result<Option<String>, ClientError>;
}

/// [`AuthBackend`] speaking to the dashboard's HTTP API.
#[derive(Clone, Debug)]
pub struct HttpAuthBackend {
    client: reqwest::Client,
    base_url: Url,
    jar: CookieJar,
}

impl HttpAuthBackend {
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
        })
    }

    #[must_use]
    pub fn jar(&self) -> &CookieJar {
        &self.jar
    }

    fn with_cookies(&self, request: RequestBuilder) -> RequestBuilder {
        match self.jar.header(Utc::now()) {
            Some(cookies) => request.header(COOKIE, cookies),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = self.with_cookies(request).send().await?;
        self.jar
            .store_response_cookies(response.headers(), Utc::now());
        Ok(response)
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn login(&self, username: &str, password: &str) -> Result<LoginGranted, ClientError> {
        let url = self.base_url.join("/api/auth/login")?;
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self.send(self.client.post(url).json(&body)).await?;
        let status = response.status();
        debug!(%status, "login response");

        match status {
            StatusCode::OK => {
                let body: LoginResponse = response.json().await?;
                Ok(LoginGranted {
                    username: body.username,
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::BAD_REQUEST => {
                let message = response
                    .json::<LoginResponse>()
                    .await
                    .ok()
                    .and_then(|body| body.error)
                    .unwrap_or_else(|| "Login failed".to_string());
                Err(ClientError::Rejected(message))
            }
            other => Err(ClientError::UnexpectedStatus(other)),
        }
    }

    async fn logout(&self) -> Result<(), ClientError> {
        let url = self.base_url.join("/api/auth/logout")?;
        let response = self.send(self.client.post(url)).await?;
        let status = response.status();
        if status.is_success() || status.is_redirection() {
            Ok(())
        } else {
            Err(ClientError::UnexpectedStatus(status))
        }
    }

    async fn session(&self) -> Result<Option<String>, ClientError> {
        let url = self.base_url.join("/api/auth/session")?;
        let response = self.send(self.client.get(url)).await?;
        match response.status() {
            StatusCode::OK => {
                let body: SessionResponse = response.json().await?;
                Ok(body.authenticated.then_some(body.username))
            }
            StatusCode::NO_CONTENT => Ok(None),
            other => Err(ClientError::UnexpectedStatus(other)),
        }
    }
}
