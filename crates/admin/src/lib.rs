//! FreshFold admin console library.
//!
//! Operators manage businesses, products and order statuses here. Every
//! page needs a backend account with an admin role.
//!
//! # Security
//!
//! The console holds admin bearer tokens in its sessions. Deploy it on a
//! private network and never behind the public storefront host.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::MemoryStore;
use tracing::Span;

use crate::state::AppState;

/// Build the admin application.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(MemoryStore::default(), state.config());
    let static_dir = ServeDir::new(&state.config().static_dir);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", static_dir)
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
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
    use crate::config::AdminConfig;

    fn test_app() -> Router {
        let config = AdminConfig::from_lookup(|key| match key {
            "FRESHFOLD_API_URL" => Some("http://127.0.0.1:9/api".to_string()),
            "ADMIN_BASE_URL" => Some("http://localhost:3001".to_string()),
            _ => None,
        })
        .unwrap();
        app(AppState::new(config).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_pages_require_sign_in() {
        let response = test_app()
            .oneshot(Request::get("/orders").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/auth/login");
    }

    #[tokio::test]
    async fn test_htmx_requests_get_client_redirect() {
        let response = test_app()
            .oneshot(
                Request::post("/orders/o1/status")
                    .header("hx-request", "true")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("status=completed"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["hx-redirect"], "/auth/login");
    }
}
