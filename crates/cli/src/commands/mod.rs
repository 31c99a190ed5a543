//! Subcommand implementations.
//!
//! # Environment Variables
//!
//! - `FRESHFOLD_API_URL` - Backend API base URL (default: `http://localhost:8001/api`)
//! - `FRESHFOLD_ADMIN_EMAIL` - Admin account used by `seed` and `orders`
//! - `FRESHFOLD_ADMIN_PASSWORD` - Password for that account

pub mod account;
pub mod orders;
pub mod postcode;
pub mod seed;

use std::time::Duration;

use freshfold_core::client::{ApiClient, ApiError};
use freshfold_core::{Email, UserRole};
use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_API_URL: &str = "http://localhost:8001/api";
const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The configured account cannot use admin endpoints.
    #[error("{email} is a {role} account; an admin account is required")]
    NotAdmin { email: String, role: UserRole },

    /// Invalid command input.
    #[error("{0}")]
    Invalid(String),

    /// Catalog file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Catalog file is not valid YAML for a catalog.
    #[error("Invalid catalog file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Build a client for the configured backend.
fn api() -> Result<ApiClient, CliError> {
    let url = std::env::var("FRESHFOLD_API_URL").unwrap_or_else(|_| {
        tracing::warn!("FRESHFOLD_API_URL not set, using {DEFAULT_API_URL}");
        DEFAULT_API_URL.to_owned()
    });
    Ok(ApiClient::new(&url, API_TIMEOUT)?)
}

/// Sign in with the configured admin credentials and return the token.
async fn admin_token(api: &ApiClient) -> Result<SecretString, CliError> {
    let email = std::env::var("FRESHFOLD_ADMIN_EMAIL")
        .map_err(|_| CliError::MissingEnvVar("FRESHFOLD_ADMIN_EMAIL"))?;
    let password = std::env::var("FRESHFOLD_ADMIN_PASSWORD")
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("FRESHFOLD_ADMIN_PASSWORD"))?;

    let email = Email::parse(&email).map_err(|e| CliError::Invalid(e.to_string()))?;

    tracing::info!(email = %email.as_str(), "Signing in...");
    let auth = api.login(&email, &password).await?;

    if !auth.user.role.is_admin() {
        return Err(CliError::NotAdmin {
            email: auth.user.email,
            role: auth.user.role,
        });
    }

    Ok(SecretString::from(auth.token))
}
