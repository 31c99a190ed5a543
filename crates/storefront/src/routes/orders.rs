//! Customer order history and confirmation pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use freshfold_core::OrderId;
use freshfold_core::client::ApiError;
use freshfold_core::models::Order;
use tracing::instrument;

use super::Layout;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{LOGIN_REQUIRED, RequireAuth, SessionContext};
use crate::models::Flash;
use crate::state::AppState;

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub orders: Vec<Order>,
    pub error: Option<String>,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/confirmation.html")]
pub struct ConfirmationTemplate {
    pub layout: Layout,
    pub order: Option<Order>,
    pub error: Option<String>,
}

/// Display the signed-in customer's orders, newest first as returned.
#[instrument(skip(state, ctx, signed_in))]
pub async fn dashboard(
    State(state): State<AppState>,
    ctx: SessionContext,
    RequireAuth(signed_in): RequireAuth,
) -> Result<Response, AppError> {
    let result = state.api().authorized(&signed_in.token).orders().await;
    let (orders, error) = match result {
        Ok(orders) => (orders, None),
        Err(e) if e.is_unauthorized() => return expired(&ctx, "/dashboard").await,
        Err(e) => {
            tracing::warn!("Failed to load orders: {e}");
            (Vec::new(), Some("Failed to load orders".to_string()))
        }
    };

    Ok(DashboardTemplate {
        layout: Layout::load(&state, &ctx).await?,
        orders,
        error,
    }
    .into_response())
}

/// Display one order after checkout.
#[instrument(skip(state, ctx, signed_in), fields(order_id = %id))]
pub async fn confirmation(
    State(state): State<AppState>,
    ctx: SessionContext,
    RequireAuth(signed_in): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Response, AppError> {
    let result = state.api().authorized(&signed_in.token).order(&id).await;
    let (order, error) = match result {
        Ok(order) => (Some(order), None),
        Err(e) if e.is_unauthorized() => {
            return expired(&ctx, &format!("/orders/{id}/confirmation")).await;
        }
        Err(e) => {
            tracing::warn!("Failed to load order details: {e}");
            (None, Some(order_error(&e)))
        }
    };

    Ok(ConfirmationTemplate {
        layout: Layout::load(&state, &ctx).await?,
        order,
        error,
    }
    .into_response())
}

fn order_error(e: &ApiError) -> String {
    if e.status() == Some(axum::http::StatusCode::NOT_FOUND) {
        e.user_message("Order not found")
    } else {
        "Failed to load order details".to_string()
    }
}

/// The backend no longer accepts the token: sign out and ask to log in.
async fn expired(ctx: &SessionContext, next: &str) -> Result<Response, AppError> {
    ctx.sign_out().await?;
    ctx.flash(Flash::info(LOGIN_REQUIRED)).await?;
    Ok(Redirect::to(&format!("/auth/login?next={}", urlencoding::encode(next))).into_response())
}
