//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Handlers that cannot recover in-page return
//! `Result<T, AppError>`; the rest catch failures and show a notice.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use freshfold_core::client::ApiError;
use thiserror::Error;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend API call failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    ///
    /// Backend rejections the user can act on pass through; anything else
    /// from the backend is a bad gateway.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Api(err) => match err.status() {
                Some(
                    status @ (StatusCode::BAD_REQUEST
                    | StatusCode::UNAUTHORIZED
                    | StatusCode::FORBIDDEN
                    | StatusCode::NOT_FOUND),
                ) => status,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn is_server_error(&self) -> bool {
        match self {
            Self::Api(err) => !err.status().is_some_and(|s| s.is_client_error()),
            Self::Session(_) | Self::Internal(_) => true,
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Api(err) => err.user_message("External service error"),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after sign-in.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on sign-out.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a customer action.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "p1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data.unwrap_or_default() {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(status: StatusCode, detail: Option<&str>) -> AppError {
        AppError::Api(ApiError::Status {
            status,
            detail: detail.map(String::from),
        })
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order-123".to_string());
        assert_eq!(err.to_string(), "Not found: order-123");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_backend_status_mapping() {
        assert_eq!(
            backend(StatusCode::NOT_FOUND, Some("Order not found")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            backend(StatusCode::FORBIDDEN, None).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            backend(StatusCode::INTERNAL_SERVER_ERROR, None).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Api(ApiError::Decode("eof".to_string())).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_client_errors_are_not_reported() {
        assert!(!backend(StatusCode::BAD_REQUEST, None).is_server_error());
        assert!(backend(StatusCode::BAD_GATEWAY, None).is_server_error());
        assert!(AppError::Internal("boom".to_string()).is_server_error());
    }
}
