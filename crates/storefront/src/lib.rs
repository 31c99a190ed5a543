//! FreshFold storefront library.
//!
//! The router is built here so the binary and the integration tests
//! serve exactly the same application.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, middleware as axum_middleware, routing::get};
use tower_http::services::ServeDir;
use tower_sessions::MemoryStore;

use crate::state::AppState;

/// Build the storefront application.
///
/// Sessions live in memory: a restart signs everyone out and empties
/// their carts.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(MemoryStore::default(), state.config());
    let static_dir = ServeDir::new(&state.config().static_dir);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", static_dir)
        .layer(session_layer)
        .layer(axum_middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the backend API is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.api().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("Backend not ready: {e}");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::middleware::request_id::REQUEST_ID_HEADER;

    fn test_app() -> Router {
        let config = StorefrontConfig::from_lookup(|key| match key {
            "FRESHFOLD_API_URL" => Some("http://127.0.0.1:9/api".to_string()),
            "STOREFRONT_BASE_URL" => Some("http://localhost:3000".to_string()),
            _ => None,
        })
        .unwrap();
        app(AppState::new(config).unwrap())
    }

    #[tokio::test]
    async fn test_health_carries_request_id_and_security_headers() {
        let response = test_app()
            .oneshot(
                Request::get("/health")
                    .header(REQUEST_ID_HEADER, "lb-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "lb-42");
        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");
    }

    #[tokio::test]
    async fn test_readiness_fails_without_backend() {
        let response = test_app()
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_cart_requires_sign_in() {
        let response = test_app()
            .oneshot(Request::get("/cart").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/login?next=%2Fcart"
        );
    }
}
