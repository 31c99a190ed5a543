//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                           - Landing page with the postcode checker
//! POST /postcode                   - Check a postcode, unlock the catalog
//! POST /postcode/clear             - Change postcode (locks the catalog)
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (pings the backend)
//!
//! # Catalog
//! GET  /services?category=         - Products grouped by subcategory
//!
//! # Cart (HTMX fragments)
//! GET  /cart                       - Cart page (requires login)
//! POST /cart/add                   - Add a product (returns the cart button)
//! POST /cart/update                - Change a quantity by +/-1 (returns cart_items)
//! POST /cart/remove                - Remove a line (returns cart_items)
//! GET  /cart/count                 - Cart count badge
//! GET  /cart/events                - SSE stream of cart count badges
//!
//! # Checkout (requires login)
//! GET  /checkout                   - Checkout form with slot defaults
//! POST /checkout                   - Place the order
//!
//! # Orders (requires login)
//! GET  /dashboard                  - Order history
//! GET  /orders/{id}/confirmation   - Order confirmation
//!
//! # Auth
//! GET  /auth/login                 - Login page
//! POST /auth/login                 - Login action
//! GET  /auth/register              - Register page
//! POST /auth/register              - Register action
//! POST /auth/logout                - Logout action
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod home;
pub mod orders;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post},
};
use freshfold_core::models::AuthUser;

use crate::error::AppError;
use crate::middleware::SessionContext;
use crate::models::Flash;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
        .route("/events", get(cart::events))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new().route("/{id}/confirmation", get(orders::confirmation))
}

/// Create all storefront routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::landing))
        .route("/postcode", post(home::check_postcode))
        .route("/postcode/clear", post(home::clear_postcode))
        .route("/services", get(catalog::index))
        .route("/checkout", get(checkout::show).post(checkout::submit))
        .route("/dashboard", get(orders::dashboard))
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .nest("/auth", auth_routes())
}

// =============================================================================
// Shared view data
// =============================================================================

/// Data every full page needs for its chrome: navigation, cart badge,
/// postcode pill, flash notice and footer links.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub user: Option<AuthUser>,
    pub cart_count: u32,
    pub postcode: Option<String>,
    pub flash: Option<Flash>,
    pub support_url: Option<String>,
}

impl Layout {
    /// Load the layout for the current session, consuming any pending flash.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(state: &AppState, ctx: &SessionContext) -> Result<Self, AppError> {
        Ok(Self {
            user: ctx.current_user().await?,
            cart_count: ctx.cart().await?.item_count(),
            postcode: ctx.postcode().await?.map(|p| p.to_string()),
            flash: ctx.take_flash().await?,
            support_url: state.config().support_whatsapp_url.clone(),
        })
    }
}

/// Whether the request was issued by HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Catalog URL for a category.
#[must_use]
pub fn catalog_url(category: Option<&str>) -> String {
    match category {
        Some(c) if !c.is_empty() => format!("/services?category={}", urlencoding::encode(c)),
        _ => "/services".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_url() {
        assert_eq!(catalog_url(None), "/services");
        assert_eq!(catalog_url(Some("")), "/services");
        assert_eq!(catalog_url(Some("Bedding")), "/services?category=Bedding");
        assert_eq!(
            catalog_url(Some("Dresses & Others")),
            "/services?category=Dresses%20%26%20Others"
        );
    }

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("hx-request", axum::http::HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));
    }
}
