//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Session layer (tower-sessions, `SameSite=Strict`)
//! 4. Auth extractors on each protected handler

pub mod auth;
pub mod session;

pub use auth::{OptionalAdminAuth, RequireAdminAuth, SignedInAdmin};
pub use session::{clear_current_admin, create_session_layer, push_flash, set_current_admin, take_flash};
