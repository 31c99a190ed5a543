//! Authentication extractors for admin.
//!
//! Provides extractors for requiring admin authentication in route handlers.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use tower_sessions::Session;

use crate::models::{CurrentAdmin, session_keys};

/// A signed-in admin together with its backend token.
#[derive(Clone)]
pub struct SignedInAdmin {
    pub admin: CurrentAdmin,
    pub token: SecretString,
}

impl std::fmt::Debug for SignedInAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedInAdmin")
            .field("admin", &self.admin)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Extractor that requires admin authentication.
///
/// If the admin is not logged in, returns a redirect to the login page
/// (an `HX-Redirect` for HTMX requests).
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(signed_in): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", signed_in.admin.name)
/// }
/// ```
pub struct RequireAdminAuth(pub SignedInAdmin);

/// Error returned when admin authentication is required but the user is not logged in.
pub enum AdminAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Client-side redirect for HTMX requests.
    HxRedirectToLogin,
    /// Unauthorized response (no session available).
    Unauthorized,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::HxRedirectToLogin => {
                (AppendHeaders([("HX-Redirect", "/auth/login")]), StatusCode::OK).into_response()
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        let admin: Option<CurrentAdmin> = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten();
        let token: Option<String> = session
            .get(session_keys::ACCESS_TOKEN)
            .await
            .ok()
            .flatten();

        match admin.zip(token) {
            Some((admin, token)) => Ok(Self(SignedInAdmin {
                admin,
                token: SecretString::from(token),
            })),
            None if parts.headers.contains_key("hx-request") => {
                Err(AdminAuthRejection::HxRedirectToLogin)
            }
            None => Err(AdminAuthRejection::RedirectToLogin),
        }
    }
}

/// Extractor that optionally gets the current admin.
///
/// Unlike `RequireAdminAuth`, this does not reject the request if the admin is not logged in.
pub struct OptionalAdminAuth(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdminAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(admin))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections() {
        let response = AdminAuthRejection::RedirectToLogin.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/auth/login");

        let response = AdminAuthRejection::HxRedirectToLogin.into_response();
        assert_eq!(response.headers().get("HX-Redirect").unwrap(), "/auth/login");
    }
}
