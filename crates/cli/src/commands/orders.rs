//! Order listing and status updates through the admin endpoints.

use freshfold_core::models::Order;
use freshfold_core::{OrderId, OrderStatus};
use tracing::info;

use super::{CliError, admin_token, api};

/// One summary line for an order.
#[must_use]
pub fn summary(order: &Order) -> String {
    format!(
        "#{:<8} {:<10} {:>9}  {} {}  {}  {}",
        order.reference(),
        order.status.as_str(),
        order.total_amount.to_string(),
        order.pickup_date,
        order.pickup_slot_label(),
        order.user_email.as_deref().unwrap_or("-"),
        order.id,
    )
}

/// List orders, optionally only those in `status`.
///
/// # Errors
///
/// Returns an error if sign-in or the backend call fails.
pub async fn list(status: Option<OrderStatus>) -> Result<Vec<Order>, CliError> {
    dotenvy::dotenv().ok();

    let api = api()?;
    let token = admin_token(&api).await?;
    let orders: Vec<Order> = api
        .authorized(&token)
        .admin_orders()
        .await?
        .into_iter()
        .filter(|order| status.is_none_or(|wanted| order.status == wanted))
        .collect();

    info!("{} order(s)", orders.len());
    for order in &orders {
        info!("{}", summary(order));
    }

    Ok(orders)
}

/// Move an order to `status`.
///
/// # Errors
///
/// Returns an error if sign-in or the backend call fails.
pub async fn set_status(id: &str, status: OrderStatus) -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let api = api()?;
    let token = admin_token(&api).await?;
    let id = OrderId::new(id);
    api.authorized(&token).update_order_status(&id, status).await?;

    info!(order_id = %id, %status, "Order status updated to {}", status.label());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line() {
        let order: Order = serde_json::from_str(
            r#"{
                "id": "0b7e4c1a-0000-0000-0000-000000000000",
                "order_number": 100042,
                "user_id": "u1",
                "user_email": "jane@example.com",
                "items": [],
                "pickup_date": "2026-10-19",
                "pickup_time": "10:00-12:00",
                "delivery_date": "2026-10-21",
                "delivery_time": "14:00-16:00",
                "address": "1 High St",
                "pin_code": "CO1",
                "payment_method": "cod",
                "total_amount": 32.5,
                "status": "processing"
            }"#,
        )
        .unwrap();

        let line = summary(&order);
        assert!(line.starts_with("#100042"));
        assert!(line.contains("processing"));
        assert!(line.contains("£32.50"));
        assert!(line.contains("jane@example.com"));
    }
}
