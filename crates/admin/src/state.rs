//! Application state shared across handlers.

use std::sync::Arc;

use freshfold_core::client::{ApiClient, ApiError};

use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    api: ApiClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: AdminConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api_url, config.api_timeout)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { config, api }),
        })
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }
}
