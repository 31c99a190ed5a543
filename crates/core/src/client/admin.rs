//! Admin endpoints. The backend refuses these for non-admin tokens.

use tracing::{info, instrument};

use super::{ApiClient, ApiError, AuthorizedClient};
use crate::models::{
    AdminStats, Business, BusinessCreated, NewBusiness, NewService, Order, Product, ProductCreated,
    ProductInput, StatusUpdate,
};
use crate::types::{BusinessId, OrderId, OrderStatus, ProductId};

impl AuthorizedClient<'_> {
    /// `GET /admin/stats`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self))]
    pub async fn admin_stats(&self) -> Result<AdminStats, ApiError> {
        ApiClient::send_json(self.get("/admin/stats")).await
    }

    /// `GET /admin/businesses`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self))]
    pub async fn businesses(&self) -> Result<Vec<Business>, ApiError> {
        ApiClient::send_json(self.get("/admin/businesses")).await
    }

    /// `POST /admin/businesses`. Platform and super admins only.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the business or the request
    /// fails.
    #[instrument(skip(self, business), fields(name = %business.name))]
    pub async fn create_business(&self, business: &NewBusiness) -> Result<BusinessId, ApiError> {
        let created: BusinessCreated =
            ApiClient::send_json(self.post("/admin/businesses").json(business)).await?;
        info!(business_id = %created.business_id, "Business created");
        Ok(created.business_id)
    }

    /// `GET /admin/products`: every product across businesses.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self))]
    pub async fn admin_products(&self) -> Result<Vec<Product>, ApiError> {
        ApiClient::send_json(self.get("/admin/products")).await
    }

    /// `POST /admin/products`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the product (for example an
    /// unknown business) or the request fails.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &ProductInput) -> Result<ProductId, ApiError> {
        let created: ProductCreated =
            ApiClient::send_json(self.post("/admin/products").json(product)).await?;
        info!(product_id = %created.product_id, "Product created");
        Ok(created.product_id)
    }

    /// `PUT /admin/products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the product or business is unknown or the request
    /// fails.
    #[instrument(skip(self, product), fields(product_id = %id))]
    pub async fn update_product(&self, id: &ProductId, product: &ProductInput) -> Result<(), ApiError> {
        ApiClient::send_unit(self.put(&format!("/admin/products/{id}")).json(product)).await
    }

    /// `DELETE /admin/products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unknown or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        ApiClient::send_unit(self.delete(&format!("/admin/products/{id}"))).await
    }

    /// `POST /admin/services` (legacy single-price services).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the service or the request
    /// fails.
    #[instrument(skip(self, service), fields(name = %service.name))]
    pub async fn create_service(&self, service: &NewService) -> Result<(), ApiError> {
        ApiClient::send_unit(self.post("/admin/services").json(service)).await
    }

    /// `GET /admin/orders`: every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self))]
    pub async fn admin_orders(&self) -> Result<Vec<Order>, ApiError> {
        ApiClient::send_json(self.get("/admin/orders")).await
    }

    /// `PATCH /admin/orders/{id}/status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is unknown or the request fails.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), ApiError> {
        ApiClient::send_unit(
            self.patch(&format!("/admin/orders/{id}/status"))
                .json(&StatusUpdate { status }),
        )
        .await?;
        info!("Order status updated");
        Ok(())
    }
}
