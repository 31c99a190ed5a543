//! Authentication extractors.
//!
//! Provides extractors for requiring a signed-in customer in route handlers.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use freshfold_core::models::AuthUser;
use tower_sessions::Session;

use super::session::{SessionContext, SignedIn};
use crate::models::Flash;

/// Notice shown when a signed-out visitor reaches a protected page.
pub const LOGIN_REQUIRED: &str = "Please login to continue";

/// Extractor that requires a signed-in account.
///
/// If nobody is signed in, a notice is queued and the browser is sent to
/// the login page with a `next` parameter pointing back here.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(signed_in): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", signed_in.user.name)
/// }
/// ```
pub struct RequireAuth(pub SignedIn);

/// Error returned when authentication is required but nobody is signed in.
pub enum AuthRejection {
    /// Redirect to login page (for full page requests).
    RedirectToLogin { next: String },
    /// Client-side redirect for HTMX requests.
    HxRedirectToLogin { next: String },
    /// Unauthorized response (no session available).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => Redirect::to(&login_url(&next)).into_response(),
            Self::HxRedirectToLogin { next } => {
                (AppendHeaders([("HX-Redirect", login_url(&next))]), StatusCode::OK).into_response()
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthRejection::Unauthorized)?;
        let ctx = SessionContext::new(session);

        if let Some(signed_in) = ctx.signed_in().await.ok().flatten() {
            return Ok(Self(signed_in));
        }

        if let Err(e) = ctx.flash(Flash::info(LOGIN_REQUIRED)).await {
            tracing::warn!("Failed to queue login notice: {e}");
        }

        let next = parts.uri.path().to_string();
        if parts.headers.contains_key("hx-request") {
            Err(AuthRejection::HxRedirectToLogin { next })
        } else {
            Err(AuthRejection::RedirectToLogin { next })
        }
    }
}

/// Login page URL that returns to `next` afterwards.
fn login_url(next: &str) -> String {
    if next.is_empty() || next == "/" {
        "/auth/login".to_string()
    } else {
        format!("/auth/login?next={}", urlencoding::encode(next))
    }
}

/// Keep `next` only if it is a local path, so login cannot redirect off-site.
#[must_use]
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| {
        n.starts_with('/') && !n.starts_with("//") && !n.contains("://") && !n.contains('\\')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url() {
        assert_eq!(login_url("/"), "/auth/login");
        assert_eq!(login_url("/checkout"), "/auth/login?next=%2Fcheckout");
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/cart")), Some("/cart"));
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("https://evil.example")), None);
        assert_eq!(safe_next(None), None);
    }

    #[test]
    fn test_rejection_redirects() {
        let response = AuthRejection::RedirectToLogin {
            next: "/cart".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").map(|v| v.to_str().ok()),
            Some(Some("/auth/login?next=%2Fcart"))
        );

        let response = AuthRejection::HxRedirectToLogin {
            next: "/cart".to_string(),
        }
        .into_response();
        assert!(response.headers().contains_key("hx-redirect"));
    }
}
