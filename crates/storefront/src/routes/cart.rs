//! Cart route handlers.
//!
//! The cart lives in the session. Mutations answer HTMX with a fragment
//! plus an `HX-Trigger` header and publish the new count so other open
//! pages of the same session update their badge.

use std::convert::Infallible;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{
        AppendHeaders, IntoResponse, Redirect, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use freshfold_core::{Cart, CartItem, CheckoutGate, MINIMUM_ORDER, ProductId};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tracing::instrument;

use super::{Layout, catalog_url, is_htmx};
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireAuth, SessionContext};
use crate::models::{Flash, FlashLevel};
use crate::services::HxTrigger;
use crate::state::AppState;

/// SSE event name carrying a rendered cart badge.
pub const CART_COUNT_EVENT: &str = "cart-count";

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub business_name: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u32,
    pub can_checkout: bool,
    /// "Minimum order value is ..." notice when below the minimum.
    pub minimum_notice: Option<String>,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let minimum_notice = match cart.checkout_gate() {
            CheckoutGate::Ready => None,
            CheckoutGate::BelowMinimum { shortfall } => Some(format!(
                "Minimum order value is {MINIMUM_ORDER}. Add {shortfall} more to checkout."
            )),
        };

        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            total: cart.total().to_string(),
            item_count: cart.item_count(),
            can_checkout: minimum_notice.is_none(),
            minimum_notice,
        }
    }
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            name: item.product_name.clone(),
            category: item.category.clone(),
            business_name: item.business_name.clone(),
            quantity: item.quantity,
            price: item.price.to_string(),
            line_total: item.line_total().to_string(),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
}

/// Update quantity form data. `delta` is `1` or `-1` from the +/- buttons.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub delta: i32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX and SSE).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Floating "View cart" button fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_fab.html")]
pub struct CartFabTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page. Requires login.
#[instrument(skip(state, ctx, _auth))]
pub async fn show(
    State(state): State<AppState>,
    ctx: SessionContext,
    _auth: RequireAuth,
) -> Result<CartShowTemplate, AppError> {
    let cart = ctx.cart().await?;
    Ok(CartShowTemplate {
        layout: Layout::load(&state, &ctx).await?,
        cart: CartView::from(&cart),
    })
}

/// Add a product to the cart.
///
/// The product is looked up in the catalog so name and price come from
/// the backend. HTMX gets the floating cart button back; plain form posts
/// are redirected to the product's category. Sessions that have not passed
/// the postcode check are sent back to the landing page.
#[instrument(skip(state, ctx, headers), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    ctx: SessionContext,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response, AppError> {
    if ctx.postcode().await?.is_none() {
        ctx.flash(Flash::info("Enter your postcode to see available services"))
            .await?;
        return Ok(if is_htmx(&headers) {
            (AppendHeaders([("HX-Redirect", "/")]), StatusCode::OK).into_response()
        } else {
            Redirect::to("/").into_response()
        });
    }

    let product = match state.catalog().find_product(&form.product_id).await {
        Ok(Some(product)) => product,
        Ok(None) => return notice(&ctx, &headers, Flash::error("Product not found")).await,
        Err(e) => {
            tracing::warn!("Failed to look up product: {e}");
            return notice(&ctx, &headers, Flash::error("Failed to load products")).await;
        }
    };

    let mut cart = ctx.cart().await?;
    let quantity = cart.add(CartItem::from_product(&product));
    let count = commit(&state, &ctx, &cart).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", product.id.as_str())]),
    );
    tracing::debug!(quantity, count, "Added to cart");

    if is_htmx(&headers) {
        Ok((
            HxTrigger::new()
                .cart_updated()
                .toast(FlashLevel::Success, "Added to cart"),
            CartFabTemplate { count },
        )
            .into_response())
    } else {
        ctx.flash(Flash::success("Added to cart")).await?;
        Ok(Redirect::to(&catalog_url(Some(&product.category))).into_response())
    }
}

/// Change a line's quantity by `delta`. Reaching zero removes the line.
#[instrument(skip(state, ctx, headers), fields(product_id = %form.product_id, delta = form.delta))]
pub async fn update(
    State(state): State<AppState>,
    ctx: SessionContext,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response, AppError> {
    let mut cart = ctx.cart().await?;
    if cart.adjust(&form.product_id, form.delta).is_some() {
        commit(&state, &ctx, &cart).await?;
    }

    Ok(items_response(&headers, &cart, HxTrigger::new().cart_updated()))
}

/// Remove a line from the cart.
#[instrument(skip(state, ctx, headers), fields(product_id = %form.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    ctx: SessionContext,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response, AppError> {
    let mut cart = ctx.cart().await?;
    let mut trigger = HxTrigger::new().cart_updated();
    if cart.remove(&form.product_id) {
        commit(&state, &ctx, &cart).await?;
        trigger = trigger.toast(FlashLevel::Success, "Item removed from cart");
        if !is_htmx(&headers) {
            ctx.flash(Flash::success("Item removed from cart")).await?;
        }
    }

    Ok(items_response(&headers, &cart, trigger))
}

/// Get the cart count badge.
#[instrument(skip(ctx))]
pub async fn count(ctx: SessionContext) -> Result<CartCountTemplate, AppError> {
    Ok(CartCountTemplate {
        count: ctx.cart().await?.item_count(),
    })
}

/// Stream this session's cart badge as it changes.
///
/// Every open page subscribes; a mutation in any of them pushes the new
/// badge to all of them.
#[instrument(skip(state, ctx))]
pub async fn events(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let cart_key = ctx.cart_key().await?;

    let stream = state.cart_events().subscribe(cart_key).map(|count| {
        let badge = CartCountTemplate { count }
            .render()
            .unwrap_or_else(|_| count.to_string());
        Ok(Event::default()
            .event(CART_COUNT_EVENT)
            .data(badge.replace(['\r', '\n'], "")))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

// =============================================================================
// Helpers
// =============================================================================

/// Save the cart and publish its new count.
async fn commit(state: &AppState, ctx: &SessionContext, cart: &Cart) -> Result<u32, AppError> {
    ctx.save_cart(cart).await?;
    let count = cart.item_count();
    state.cart_events().publish(ctx.cart_key().await?, count);
    Ok(count)
}

fn items_response(headers: &HeaderMap, cart: &Cart, trigger: HxTrigger) -> Response {
    if is_htmx(headers) {
        (
            trigger,
            CartItemsTemplate {
                cart: CartView::from(cart),
            },
        )
            .into_response()
    } else {
        Redirect::to("/cart").into_response()
    }
}

/// Report a failure without swapping anything (HTMX) or via flash.
async fn notice(
    ctx: &SessionContext,
    headers: &HeaderMap,
    flash: Flash,
) -> Result<Response, AppError> {
    if is_htmx(headers) {
        return Ok((
            HxTrigger::new().toast(flash.level, flash.message),
            StatusCode::NO_CONTENT,
        )
            .into_response());
    }
    ctx.flash(flash).await?;
    Ok(Redirect::to("/services").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use freshfold_core::{BusinessId, Money};

    use super::*;

    fn item(id: &str, pence: i64, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            product_name: format!("Item {id}"),
            category: "Bedding".to_string(),
            subcategory: None,
            business_id: BusinessId::new("b1"),
            business_name: "Bubbles".to_string(),
            price: Money::from_pence(pence),
            quantity,
        }
    }

    #[test]
    fn test_cart_view_below_minimum() {
        let mut cart = Cart::new();
        cart.add(item("duvet", 1050, 1));

        let view = CartView::from(&cart);
        assert!(!view.can_checkout);
        assert_eq!(
            view.minimum_notice.as_deref(),
            Some("Minimum order value is £30.00. Add £19.50 more to checkout.")
        );
        assert_eq!(view.total, "£10.50");
    }

    #[test]
    fn test_cart_view_ready() {
        let mut cart = Cart::new();
        cart.add(item("curtains", 1500, 1));
        cart.set_quantity(&ProductId::new("curtains"), 2);

        let view = CartView::from(&cart);
        assert!(view.can_checkout);
        assert!(view.minimum_notice.is_none());
        assert_eq!(view.items[0].line_total, "£30.00");
        assert_eq!(view.item_count, 2);
    }

    #[test]
    fn test_badge_renders() {
        let html = CartCountTemplate { count: 3 }.render().unwrap();
        assert!(html.contains('3'));
        assert!(!html.contains("badge-empty"));

        let html = CartCountTemplate { count: 0 }.render().unwrap();
        assert!(html.contains("badge-empty"));
    }

    #[test]
    fn test_fab_hidden_when_empty() {
        let html = CartFabTemplate { count: 0 }.render().unwrap();
        assert!(!html.contains("/cart"));

        let html = CartFabTemplate { count: 2 }.render().unwrap();
        assert!(html.contains("View cart (2)"));
    }
}
