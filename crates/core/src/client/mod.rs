//! Typed HTTP client for the FreshFold backend API.
//!
//! The backend owns pricing, availability, persistence and auth. Every call
//! is a single awaited request with the configured timeout; nothing is
//! retried.
//!
//! Public endpoints hang off [`ApiClient`]. Endpoints that need a signed-in
//! account take the bearer token explicitly through
//! [`ApiClient::authorized`], so there is no ambient auth state.
//!
//! ```rust,ignore
//! let api = ApiClient::new("http://localhost:8001/api", Duration::from_secs(10))?;
//! let auth = api.login(&email, &password).await?;
//! let token = SecretString::from(auth.token);
//! let orders = api.authorized(&token).orders().await?;
//! ```

mod admin;
mod auth;
mod catalog;
mod error;
mod orders;

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

pub use auth::Registration;
pub use catalog::ProductFilter;
pub use error::ApiError;

/// Client for the public (unauthenticated) backend endpoints.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    /// Base URL without a trailing slash, e.g. `http://localhost:8001/api`.
    base_url: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse or the HTTP client cannot
    /// be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)?;
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("freshfold/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_owned(),
        })
    }

    /// Borrow this client with a bearer token for authenticated endpoints.
    #[must_use]
    pub const fn authorized<'a>(&'a self, token: &'a SecretString) -> AuthorizedClient<'a> {
        AuthorizedClient { api: self, token }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path))
    }

    /// Send a request and decode a JSON body.
    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let body = Self::send_checked(request).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send a request, ignoring any success body.
    async fn send_unit(request: RequestBuilder) -> Result<(), ApiError> {
        Self::send_checked(request).await.map(drop)
    }

    async fn send_checked(request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(%status, "Backend rejected request");
            return Err(ApiError::from_body(status, &body));
        }
        Ok(body)
    }
}

/// An [`ApiClient`] paired with a bearer token.
#[derive(Clone, Copy)]
pub struct AuthorizedClient<'a> {
    api: &'a ApiClient,
    token: &'a SecretString,
}

impl std::fmt::Debug for AuthorizedClient<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedClient")
            .field("api", self.api)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl AuthorizedClient<'_> {
    fn get(&self, path: &str) -> RequestBuilder {
        self.api.get(path).bearer_auth(self.token.expose_secret())
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.api.post(path).bearer_auth(self.token.expose_secret())
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.api
            .http
            .put(self.api.url(path))
            .bearer_auth(self.token.expose_secret())
    }

    fn patch(&self, path: &str) -> RequestBuilder {
        self.api
            .http
            .patch(self.api.url(path))
            .bearer_auth(self.token.expose_secret())
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        self.api
            .http
            .delete(self.api.url(path))
            .bearer_auth(self.token.expose_secret())
    }
}
