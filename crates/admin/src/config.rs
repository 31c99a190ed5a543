//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FRESHFOLD_API_URL` - Backend API base URL, including the `/api` prefix
//! - `ADMIN_BASE_URL` - Public URL for the admin console
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_STATIC_DIR` - Static asset directory (default: crates/admin/static)
//! - `FRESHFOLD_API_TIMEOUT_SECS` - Backend request timeout (default: 10)
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

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Backend API base URL
    pub api_url: String,
    /// Timeout applied to every backend request
    pub api_timeout: Duration,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin console
    pub base_url: String,
    /// Directory served under `/static`
    pub static_dir: String,
    pub log_format: LogFormat,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required =
            |key: &str| get(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()));

        Ok(Self {
            api_url: required("FRESHFOLD_API_URL")?,
            api_timeout: Duration::from_secs(parse_or(
                "FRESHFOLD_API_TIMEOUT_SECS",
                get("FRESHFOLD_API_TIMEOUT_SECS"),
                10,
            )?),
            host: parse_or("ADMIN_HOST", get("ADMIN_HOST"), IpAddr::from([127, 0, 0, 1]))?,
            port: parse_or("ADMIN_PORT", get("ADMIN_PORT"), 3001)?,
            base_url: required("ADMIN_BASE_URL")?,
            static_dir: get("ADMIN_STATIC_DIR")
                .unwrap_or_else(|| "crates/admin/static".to_string()),
            log_format: match get("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_or("SENTRY_SAMPLE_RATE", get("SENTRY_SAMPLE_RATE"), 1.0)?,
            sentry_traces_sample_rate: parse_or(
                "SENTRY_TRACES_SAMPLE_RATE",
                get("SENTRY_TRACES_SAMPLE_RATE"),
                0.0,
            )?,
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

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}
