//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FRESHFOLD_API_URL` - Backend API base URL, including the `/api` prefix
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_STATIC_DIR` - Static asset directory (default: crates/storefront/static)
//! - `FRESHFOLD_API_TIMEOUT_SECS` - Backend request timeout (default: 10)
//! - `CATALOG_CACHE_TTL_SECS` - Category/product cache lifetime (default: 300)
//! - `SUPPORT_WHATSAPP_URL` - Support chat link shown in the footer
//! - `ADMIN_CONSOLE_URL` - Where admins land after signing in here
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend API base URL
    pub api_url: String,
    /// Timeout applied to every backend request
    pub api_timeout: Duration,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Directory served under `/static`
    pub static_dir: String,
    /// How long catalog responses stay cached
    pub catalog_cache_ttl: Duration,
    /// Support chat link
    pub support_whatsapp_url: Option<String>,
    /// Admin console URL for admins who sign in on the storefront
    pub admin_console_url: Option<String>,
    pub log_format: LogFormat,
    pub sentry: SentryConfig,
}

/// Sentry settings shared by both binaries.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        Ok(Self {
            api_url: env.required("FRESHFOLD_API_URL")?,
            api_timeout: Duration::from_secs(env.parsed_or("FRESHFOLD_API_TIMEOUT_SECS", 10)?),
            host: env.parsed_or("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: env.parsed_or("STOREFRONT_PORT", 3000)?,
            base_url: env.required("STOREFRONT_BASE_URL")?,
            static_dir: env.or_default("STOREFRONT_STATIC_DIR", "crates/storefront/static"),
            catalog_cache_ttl: Duration::from_secs(env.parsed_or("CATALOG_CACHE_TTL_SECS", 300)?),
            support_whatsapp_url: env.optional("SUPPORT_WHATSAPP_URL"),
            admin_console_url: env.optional("ADMIN_CONSOLE_URL"),
            log_format: env.log_format(),
            sentry: SentryConfig {
                dsn: env.optional("SENTRY_DSN"),
                environment: env.optional("SENTRY_ENVIRONMENT"),
                sample_rate: env.parsed_or("SENTRY_SAMPLE_RATE", 1.0)?,
                traces_sample_rate: env.parsed_or("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
            },
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    fn log_format(&self) -> LogFormat {
        match self.optional("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("FRESHFOLD_API_URL", "http://localhost:8001/api"),
            ("STOREFRONT_BASE_URL", "http://localhost:3000"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.api_timeout, Duration::from_secs(10));
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.sentry.dsn.is_none());
        assert!(!config.is_secure());
    }

    #[test]
    fn test_missing_api_url() {
        let err = StorefrontConfig::from_lookup(lookup(&[(
            "STOREFRONT_BASE_URL",
            "http://localhost:3000",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "FRESHFOLD_API_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let err = StorefrontConfig::from_lookup(lookup(&[
            ("FRESHFOLD_API_URL", "http://localhost:8001/api"),
            ("STOREFRONT_BASE_URL", "http://localhost:3000"),
            ("STOREFRONT_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("FRESHFOLD_API_URL", "https://api.freshfold.co.uk/api"),
            ("STOREFRONT_BASE_URL", "https://freshfold.co.uk"),
            ("STOREFRONT_HOST", "0.0.0.0"),
            ("STOREFRONT_PORT", "8080"),
            ("CATALOG_CACHE_TTL_SECS", "30"),
            ("LOG_FORMAT", "json"),
            ("SENTRY_TRACES_SAMPLE_RATE", "0.25"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(30));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!((config.sentry.traces_sample_rate - 0.25).abs() < f32::EPSILON);
        assert!(config.is_secure());
    }
}
