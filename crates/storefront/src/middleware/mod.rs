//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction per route)
//! 2. Request ID (add unique ID to each request)
//! 3. Security headers (CSP, frame and sniffing protection)
//! 4. Session layer (tower-sessions with an in-memory store)

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{LOGIN_REQUIRED, RequireAuth, safe_next};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SessionContext, SignedIn, create_session_layer};
