//! Records exchanged with the FreshFold backend API.
//!
//! These mirror the backend's JSON shapes. Fields the backend added over
//! time are `#[serde(default)]` so older records still decode.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::types::{
    BusinessId, DeliveryInstruction, Money, OrderId, OrderStatus, PaymentMethod, PaymentStatus,
    PickupInstruction, ProductId, TimeSlot, UserId, UserRole, slot_label,
};

// =============================================================================
// Auth
// =============================================================================

/// The signed-in account as returned by login and registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Response body of `POST /auth/login` and `POST /auth/register`.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthUser,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

// =============================================================================
// Businesses and the postcode gate
// =============================================================================

/// A laundry business on the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    pub id: BusinessId,
    pub name: String,
    pub owner_email: String,
    #[serde(default)]
    pub pin_codes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /admin/businesses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBusiness {
    pub name: String,
    pub owner_email: String,
    pub pin_codes: Vec<String>,
}

impl NewBusiness {
    /// Split a comma-separated postcode list, trimming and dropping empties.
    #[must_use]
    pub fn split_pin_codes(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

/// Response of `POST /pincode/check`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostcodeAvailability {
    pub available: bool,
    #[serde(default)]
    pub businesses: Vec<Business>,
}

// =============================================================================
// Catalog
// =============================================================================

/// A priced service offered by one business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub business_id: BusinessId,
    pub business_name: String,
    pub service_type: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i64>,
}

/// Body of `POST /admin/products` and `PUT /admin/products/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub business_id: BusinessId,
    pub service_type: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub name: String,
    pub price: Money,
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            business_id: product.business_id.clone(),
            service_type: product.service_type.clone(),
            category: product.category.clone(),
            subcategory: product.subcategory.clone(),
            name: product.name.clone(),
            price: product.price,
            icon_url: product.icon_url.clone(),
            sort_order: product.sort_order,
        }
    }
}

/// Body of the legacy `POST /admin/services` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewService {
    pub business_id: BusinessId,
    pub name: String,
    pub category: String,
    pub base_price: Money,
    pub description: String,
    pub image_url: Option<String>,
}

/// Entry of `GET /categories` and `GET /service-types`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntry {
    pub name: String,
}

// =============================================================================
// Orders
// =============================================================================

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub items: Vec<CartItem>,
    pub pickup_date: NaiveDate,
    pub pickup_time: TimeSlot,
    pub pickup_instruction: PickupInstruction,
    pub delivery_date: NaiveDate,
    pub delivery_time: TimeSlot,
    pub delivery_instruction: DeliveryInstruction,
    pub address: String,
    pub pin_code: String,
    pub payment_method: PaymentMethod,
    pub total_amount: Money,
}

/// Response of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_id: OrderId,
    #[serde(default)]
    pub order_number: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A placed order as read back from the backend.
///
/// Scheduling fields stay as the stored strings; labels are derived for
/// display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub order_number: Option<u64>,
    pub user_id: UserId,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    pub items: Vec<CartItem>,
    pub pickup_date: String,
    pub pickup_time: String,
    #[serde(default)]
    pub pickup_instruction: Option<String>,
    pub delivery_date: String,
    pub delivery_time: String,
    #[serde(default)]
    pub delivery_instruction: Option<String>,
    pub address: String,
    pub pin_code: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub total_amount: Money,
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Customer-facing reference: the order number, else a short id.
    #[must_use]
    pub fn reference(&self) -> String {
        self.order_number
            .map_or_else(|| self.id.short().to_uppercase(), |n| n.to_string())
    }

    #[must_use]
    pub fn pickup_slot_label(&self) -> &str {
        slot_label(&self.pickup_time)
    }

    #[must_use]
    pub fn delivery_slot_label(&self) -> &str {
        slot_label(&self.delivery_time)
    }

    /// Sum of item quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Body of `PATCH /admin/orders/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

// =============================================================================
// Admin
// =============================================================================

/// Response of `GET /admin/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_revenue: Money,
    #[serde(default)]
    pub total_businesses: u64,
    #[serde(default, alias = "total_services")]
    pub total_products: u64,
}

/// Response of `POST /admin/businesses`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BusinessCreated {
    pub business_id: BusinessId,
}

/// Response of `POST /admin/products`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductCreated {
    pub product_id: ProductId,
}
