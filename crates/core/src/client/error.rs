//! Backend API errors.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when calling the FreshFold backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Status {
        status: StatusCode,
        /// The backend's `detail` message, if it sent one.
        detail: Option<String>,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected backend response: {0}")]
    Decode(String),

    /// The configured base URL could not be used.
    #[error("invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Message to show a user: the backend's own `detail` when present,
    /// otherwise `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => fallback.to_owned(),
        }
    }

    /// HTTP status returned by the backend, if any.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend rejected the bearer token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Whether the failure happened before the backend answered.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    /// Build a [`ApiError::Status`] from a response body.
    ///
    /// FastAPI-style bodies carry `detail` either as a string or as a list
    /// of validation problems; the first problem's `msg` is used then.
    pub(crate) fn from_body(status: StatusCode, body: &str) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            detail: Option<serde_json::Value>,
        }

        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail)
            .and_then(|detail| match detail {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Array(items) => items
                    .first()
                    .and_then(|item| item.get("msg"))
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_owned),
                _ => None,
            });

        Self::Status { status, detail }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_detail_is_shown_verbatim() {
        let err = ApiError::from_body(
            StatusCode::BAD_REQUEST,
            r#"{"detail":"Minimum order value is £30"}"#,
        );
        assert_eq!(
            err.user_message("Failed to place order"),
            "Minimum order value is £30"
        );
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_validation_list_uses_first_msg() {
        let err = ApiError::from_body(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":[{"loc":["body","email"],"msg":"value is not a valid email address"}]}"#,
        );
        assert_eq!(
            err.user_message("Registration failed"),
            "value is not a valid email address"
        );
    }

    #[test]
    fn test_missing_detail_falls_back() {
        let err = ApiError::from_body(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(err.user_message("Failed to place order"), "Failed to place order");
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_unauthorized() {
        let err = ApiError::from_body(StatusCode::UNAUTHORIZED, r#"{"detail":"Invalid token"}"#);
        assert!(err.is_unauthorized());
    }
}
