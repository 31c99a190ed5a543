//! Orders management route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use freshfold_core::models::Order;
use freshfold_core::{OrderId, OrderStatus};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{Layout, Toast, is_htmx};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAdminAuth, push_flash};
use crate::models::Flash;
use crate::state::AppState;

/// One `<option>` of the status select.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Order row view for templates.
#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: String,
    pub reference: String,
    pub customer_name: String,
    pub customer_email: String,
    pub created_at: String,
    pub pickup: String,
    pub delivery: String,
    pub address: String,
    pub items: String,
    pub total: String,
    pub payment: &'static str,
    pub status: &'static str,
    pub status_options: Vec<StatusOption>,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        let items = order
            .items
            .iter()
            .map(|item| format!("{} x {}", item.quantity, item.product_name))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            id: order.id.to_string(),
            reference: order.reference(),
            customer_name: order.user_name.clone().unwrap_or_default(),
            customer_email: order.user_email.clone().unwrap_or_default(),
            created_at: order
                .created_at
                .map(|at| at.format("%d %b %Y %H:%M").to_string())
                .unwrap_or_default(),
            pickup: format!("{} {}", order.pickup_date, order.pickup_slot_label()),
            delivery: format!("{} {}", order.delivery_date, order.delivery_slot_label()),
            address: format!("{}, {}", order.address, order.pin_code),
            items,
            total: order.total_amount.to_string(),
            payment: order.payment_method.label(),
            status: order.status.as_str(),
            status_options: OrderStatus::ALL
                .iter()
                .map(|s| StatusOption {
                    value: s.as_str(),
                    label: s.label(),
                    selected: *s == order.status,
                })
                .collect(),
        }
    }
}

/// Status update form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: OrderStatus,
}

/// Orders list page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub layout: Layout,
    pub orders: Vec<OrderRow>,
    pub error: Option<String>,
}

/// A single order row (for HTMX swaps).
#[derive(Template, WebTemplate)]
#[template(path = "partials/order_row.html")]
pub struct OrderRowTemplate {
    pub order: OrderRow,
}

/// Orders list page handler.
#[instrument(skip(state, session, signed_in))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(signed_in): RequireAdminAuth,
) -> Result<OrdersIndexTemplate, AppError> {
    let (orders, error) = match state.api().authorized(&signed_in.token).admin_orders().await {
        Ok(orders) => (orders.iter().map(OrderRow::from).collect(), None),
        Err(e) => {
            tracing::warn!("Failed to load orders: {e}");
            (Vec::new(), Some("Failed to load data".to_string()))
        }
    };

    Ok(OrdersIndexTemplate {
        layout: Layout::load(&session, &signed_in.admin, "/orders").await?,
        orders,
        error,
    })
}

/// Move an order to a new status.
///
/// The row is re-rendered from a fresh listing so it shows what the
/// backend now holds. If that reload fails the update still stands, so
/// HTMX gets the success toast without a swap.
#[instrument(skip(state, session, signed_in, headers), fields(order_id = %id, status = %form.status))]
pub async fn update_status(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(signed_in): RequireAdminAuth,
    headers: HeaderMap,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Response, AppError> {
    let api = state.api().authorized(&signed_in.token);

    if let Err(e) = api.update_order_status(&id, form.status).await {
        tracing::warn!("Failed to update order status: {e}");
        let message = e.user_message("Failed to update order status");
        if is_htmx(&headers) {
            return Ok((Toast::error(message), StatusCode::NO_CONTENT).into_response());
        }
        push_flash(&session, Flash::error(message)).await?;
        return Ok(Redirect::to("/orders").into_response());
    }

    if !is_htmx(&headers) {
        push_flash(&session, Flash::success("Order status updated")).await?;
        return Ok(Redirect::to("/orders").into_response());
    }

    let refreshed = match api.admin_orders().await {
        Ok(orders) => orders
            .iter()
            .find(|order| order.id == id)
            .map(OrderRow::from),
        Err(e) => {
            tracing::warn!("Failed to reload orders after status update: {e}");
            None
        }
    };

    let toast = Toast::success("Order status updated");
    Ok(match refreshed {
        Some(order) => (toast, OrderRowTemplate { order }).into_response(),
        None => (toast, StatusCode::NO_CONTENT).into_response(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn order() -> Order {
        serde_json::from_value(json!({
            "id": "o1",
            "order_number": 100_001,
            "user_id": "u1",
            "user_name": "Jane",
            "user_email": "jane@example.com",
            "items": [{
                "product_id": "p1",
                "product_name": "Duvet",
                "category": "Bedding",
                "business_id": "b1",
                "business_name": "Bubbles",
                "price": 15.0,
                "quantity": 2
            }],
            "pickup_date": "2026-10-18",
            "pickup_time": "10:00-12:00",
            "delivery_date": "2026-10-20",
            "delivery_time": "14:00-16:00",
            "address": "1 High St",
            "pin_code": "E14",
            "payment_method": "cod",
            "total_amount": 30.0,
            "status": "confirmed"
        }))
        .unwrap()
    }

    #[test]
    fn test_order_row_marks_current_status() {
        let row = OrderRow::from(&order());
        let selected: Vec<_> = row
            .status_options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value)
            .collect();
        assert_eq!(selected, ["confirmed"]);
        assert_eq!(row.reference, "100001");
        assert_eq!(row.items, "2 x Duvet");
        assert_eq!(row.total, "£30.00");
    }

    #[test]
    fn test_order_row_renders() {
        let html = OrderRowTemplate {
            order: OrderRow::from(&order()),
        }
        .render()
        .unwrap();
        assert!(html.contains("id=\"order-o1\""));
        assert!(html.contains("/orders/o1/status"));
    }
}
