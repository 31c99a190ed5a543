//! Unified error handling for admin.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use freshfold_core::client::ApiError;
use thiserror::Error;

/// Application-level error type for the admin console.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend API call failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let backend_status = match &self {
            Self::Api(err) => err.status(),
            _ => None,
        };

        // Log server errors with Sentry
        let is_server_error = match &self {
            Self::Api(_) => !backend_status.is_some_and(|s| s.is_client_error()),
            Self::Session(_) => true,
            _ => false,
        };
        if is_server_error {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = match &self {
            Self::Api(_) => match backend_status {
                Some(
                    s @ (StatusCode::BAD_REQUEST
                    | StatusCode::UNAUTHORIZED
                    | StatusCode::FORBIDDEN
                    | StatusCode::NOT_FOUND),
                ) => s,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Session(_) => "Internal server error".to_string(),
            Self::Api(err) => err.user_message("External service error"),
        };

        (status, message).into_response()
    }
}

/// Set the Sentry user context from a signed-in admin.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Api(ApiError::Status {
            status: StatusCode::FORBIDDEN,
            detail: Some("Admin access required".to_string()),
        });
        assert_eq!(
            err.to_string(),
            "Backend error: backend returned 403 Forbidden: Admin access required"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::Api(ApiError::Status {
                status: StatusCode::NOT_FOUND,
                detail: None,
            })),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Status {
                status: StatusCode::FORBIDDEN,
                detail: None,
            })),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Decode("bad".to_string()))),
            StatusCode::BAD_GATEWAY
        );
    }
}
