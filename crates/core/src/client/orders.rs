//! Customer order endpoints.

use tracing::{info, instrument};

use super::{ApiClient, ApiError, AuthorizedClient};
use crate::models::{NewOrder, Order, OrderCreated};
use crate::types::OrderId;

impl AuthorizedClient<'_> {
    /// `POST /orders`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] when the backend refuses the order (for
    /// example below its minimum), or a transport error.
    #[instrument(skip(self, order), fields(items = order.items.len(), total = %order.total_amount))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<OrderCreated, ApiError> {
        let created: OrderCreated =
            ApiClient::send_json(self.post("/orders").json(order)).await?;
        info!(order_id = %created.order_id, "Order placed");
        Ok(created)
    }

    /// `GET /orders`: the caller's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        ApiClient::send_json(self.get("/orders")).await
    }

    /// `GET /orders/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] with 404 for an unknown order or 403 for
    /// someone else's, or a transport error.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order(&self, id: &OrderId) -> Result<Order, ApiError> {
        ApiClient::send_json(self.get(&format!("/orders/{id}"))).await
    }
}
