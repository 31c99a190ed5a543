//! Login, registration and current-account endpoints.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::instrument;

use super::{ApiClient, ApiError, AuthorizedClient};
use crate::models::{AuthResponse, AuthUser};
use crate::types::Email;

/// Details collected by the registration form.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub password: SecretString,
}

impl ApiClient {
    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] with `Invalid credentials` on a bad
    /// email/password pair, or a transport error.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &SecretString) -> Result<AuthResponse, ApiError> {
        #[derive(Serialize)]
        struct LoginBody<'a> {
            email: &'a str,
            password: &'a str,
        }

        let body = LoginBody {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        Self::send_json(self.post("/auth/login").json(&body)).await
    }

    /// `POST /auth/register`. New accounts are always customers.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] (e.g. `Email already registered`) or a
    /// transport error.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        #[derive(Serialize)]
        struct RegisterBody<'a> {
            email: &'a str,
            password: &'a str,
            name: &'a str,
            phone: &'a str,
        }

        let body = RegisterBody {
            email: registration.email.as_str(),
            password: registration.password.expose_secret(),
            name: &registration.name,
            phone: &registration.phone,
        };
        Self::send_json(self.post("/auth/register").json(&body)).await
    }
}

impl AuthorizedClient<'_> {
    /// `GET /auth/me`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<AuthUser, ApiError> {
        ApiClient::send_json(self.get("/auth/me")).await
    }
}
