//! Application state shared across handlers.

use std::sync::Arc;

use freshfold_core::client::{ApiClient, ApiError};

use crate::config::StorefrontConfig;
use crate::services::{CartEvents, CatalogService};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    catalog: CatalogService,
    cart_events: CartEvents,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api_url, config.api_timeout)?;
        let catalog = CatalogService::new(api.clone(), config.catalog_cache_ttl);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                catalog,
                cart_events: CartEvents::new(),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the cached catalog.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get a reference to the cart event hub.
    #[must_use]
    pub fn cart_events(&self) -> &CartEvents {
        &self.inner.cart_events
    }
}
