//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Dashboard
//! GET  /                           - Stats overview
//!
//! # Auth (backend credentials, admin roles only)
//! GET  /auth/login                 - Login page
//! POST /auth/login                 - Login
//! POST /auth/logout                - Logout
//!
//! # Orders
//! GET  /orders                     - Order listing with status selects
//! POST /orders/{id}/status         - Update status (HTMX row swap)
//!
//! # Businesses
//! GET  /businesses                 - Business listing + create form
//! POST /businesses                 - Create business (platform admins)
//!
//! # Products
//! GET  /products                   - Grouped listing with filters
//! GET  /products/new               - Create form
//! POST /products                   - Create
//! GET  /products/{id}/edit         - Edit form
//! POST /products/{id}              - Update
//! POST /products/{id}/delete       - Delete
//!
//! # Legacy services
//! GET  /services/new               - Create form
//! POST /services                   - Create
//! ```

pub mod auth;
pub mod businesses;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod services;

use axum::{
    Router,
    http::{HeaderMap, HeaderValue},
    response::{IntoResponseParts, ResponseParts},
    routing::{get, post},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::middleware::take_flash;
use crate::models::{CurrentAdmin, Flash};
use crate::state::AppState;

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/orders", get(orders::index))
        .route("/orders/{id}/status", post(orders::update_status))
        .route("/businesses", get(businesses::index).post(businesses::create))
        .route("/products", get(products::index).post(products::create))
        .route("/products/new", get(products::new))
        .route("/products/{id}", post(products::update))
        .route("/products/{id}/edit", get(products::edit))
        .route("/products/{id}/delete", post(products::delete))
        .route("/services/new", get(services::new))
        .route("/services", post(services::create))
}

/// Shared page chrome: the signed-in admin, navigation state and any
/// pending notice.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub admin: Option<CurrentAdmin>,
    pub current_path: String,
    pub flash: Option<Flash>,
}

impl Layout {
    /// Build the layout, consuming any pending flash.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(
        session: &Session,
        admin: &CurrentAdmin,
        current_path: &str,
    ) -> Result<Self, AppError> {
        Ok(Self {
            admin: Some(admin.clone()),
            current_path: current_path.to_string(),
            flash: take_flash(session).await?,
        })
    }

    /// Show `flash` on this render instead of any queued one.
    #[must_use]
    pub fn with_flash(mut self, flash: Flash) -> Self {
        self.flash = Some(flash);
        self
    }

    /// Whether the nav link for `path` is the current section.
    #[must_use]
    pub fn is_current(&self, path: &str) -> bool {
        if path == "/" {
            self.current_path == "/"
        } else {
            self.current_path.starts_with(path)
        }
    }
}

/// Whether the request came from HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// `HX-Trigger` header raising a `toast` event on the page.
#[derive(Debug, Clone)]
pub struct Toast(pub Flash);

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self(Flash::success(message))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self(Flash::error(message))
    }

    /// Header value. Non-ASCII text is escaped so the value is valid in an
    /// HTTP header.
    #[must_use]
    pub fn header_value(&self) -> String {
        let raw = serde_json::json!({
            "toast": { "level": self.0.level.as_str(), "message": self.0.message }
        })
        .to_string();

        raw.chars().fold(String::with_capacity(raw.len()), |mut out, ch| {
            if ch.is_ascii() {
                out.push(ch);
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{unit:04x}"));
                }
            }
            out
        })
    }
}

impl IntoResponseParts for Toast {
    type Error = std::convert::Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        match HeaderValue::from_str(&self.header_value()) {
            Ok(value) => {
                res.headers_mut().insert("HX-Trigger", value);
            }
            Err(e) => tracing::warn!("Dropping unencodable HX-Trigger header: {e}"),
        }
        Ok(res)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_header_escapes_pound_sign() {
        let toast = Toast::error("Minimum order value is £30");
        let value = toast.header_value();
        assert!(value.is_ascii());
        assert!(value.contains("\\u00a3"));

        let parsed: serde_json::Value = serde_json::from_str(&value).unwrap();
        assert_eq!(parsed["toast"]["level"], "error");
        assert_eq!(parsed["toast"]["message"], "Minimum order value is £30");
    }

    #[test]
    fn test_layout_current_section() {
        let layout = Layout {
            current_path: "/products/new".to_string(),
            ..Layout::default()
        };
        assert!(layout.is_current("/products"));
        assert!(!layout.is_current("/"));
        assert!(!layout.is_current("/orders"));
    }
}
