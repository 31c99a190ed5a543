//! In-memory stand-in for the FreshFold backend REST API.
//!
//! Serves every endpoint the storefront, admin and CLI call, under `/api`,
//! with the same JSON shapes and `{"detail": ...}` errors. State lives for
//! the lifetime of one [`FakeBackend`], so each test starts clean.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, patch, post, put},
};
use chrono::Utc;
use freshfold_core::models::{
    AdminStats, Business, NamedEntry, NewBusiness, NewOrder, NewService, Order, PostcodeAvailability,
    Product, ProductInput, StatusUpdate,
};
use freshfold_core::{
    BusinessId, MINIMUM_ORDER, Money, OrderId, OrderStatus, PaymentStatus, ProductId, UserId, UserRole,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Seeded platform admin.
pub const ADMIN_EMAIL: &str = "admin@freshfold.test";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Postcode the seeded business serves.
pub const SERVED_POSTCODE: &str = "CO1";

/// First order number handed out.
const FIRST_ORDER_NUMBER: u64 = 100_000;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;

fn detail(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": message })))
}

#[derive(Debug, Clone)]
struct Account {
    id: UserId,
    email: String,
    password: String,
    name: String,
    phone: String,
    role: UserRole,
}

impl Account {
    fn user_json(&self) -> Value {
        json!({
            "id": self.id,
            "email": self.email,
            "name": self.name,
            "role": self.role,
            "phone": self.phone,
        })
    }
}

#[derive(Debug, Default)]
struct Store {
    accounts: Vec<Account>,
    tokens: HashMap<String, UserId>,
    businesses: Vec<Business>,
    products: Vec<Product>,
    services: Vec<NewService>,
    orders: Vec<Order>,
    next_order_number: u64,
    /// Detail returned by the next `POST /orders`, once.
    fail_next_order: Option<String>,
    /// Whether the next `GET /admin/orders` fails, once.
    fail_next_listing: bool,
}

impl Store {
    fn issue_token(&mut self, user_id: &UserId) -> String {
        let token = Uuid::new_v4().to_string();
        self.tokens.insert(token.clone(), user_id.clone());
        token
    }

    fn account(&self, headers: &HeaderMap) -> Result<Account, (StatusCode, Json<Value>)> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Not authenticated"))?;

        let user_id = self
            .tokens
            .get(token)
            .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Invalid token"))?;

        self.accounts
            .iter()
            .find(|a| &a.id == user_id)
            .cloned()
            .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "User not found"))
    }

    fn admin(&self, headers: &HeaderMap) -> Result<Account, (StatusCode, Json<Value>)> {
        let account = self.account(headers)?;
        if account.role.is_admin() {
            Ok(account)
        } else {
            Err(detail(StatusCode::FORBIDDEN, "Admin access required"))
        }
    }

    fn business(&self, id: &BusinessId) -> Result<Business, (StatusCode, Json<Value>)> {
        self.businesses
            .iter()
            .find(|b| &b.id == id)
            .cloned()
            .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Business not found"))
    }
}

/// Handle to a fake backend. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct FakeBackend {
    store: Arc<Mutex<Store>>,
}

impl FakeBackend {
    /// A backend holding one platform admin and one business serving
    /// [`SERVED_POSTCODE`] with a small catalog.
    #[must_use]
    pub fn seeded() -> Self {
        let business = Business {
            id: BusinessId::new("b-bubbles"),
            name: "Bubbles Laundry".to_owned(),
            owner_email: "owner@bubbles.test".to_owned(),
            pin_codes: vec![SERVED_POSTCODE.to_owned(), "CO2".to_owned()],
            created_at: Some(Utc::now()),
        };

        let product = |id: &str, service_type: &str, category: &str, name: &str, pence: i64| Product {
            id: ProductId::new(id),
            business_id: business.id.clone(),
            business_name: business.name.clone(),
            service_type: service_type.to_owned(),
            category: category.to_owned(),
            subcategory: None,
            name: name.to_owned(),
            price: Money::from_pence(pence),
            icon_url: None,
            sort_order: Some(0),
        };

        let products = vec![
            product("p-shirt", "Dry Cleaning", "Tops", "Shirt", 495),
            product("p-coat", "Dry Cleaning", "Outerwear", "Coat", 1495),
            product("p-duvet", "Household & Bulk Laundry", "Bedding", "Double Duvet", 1595),
            product("p-towel", "Household & Bulk Laundry", "Towels", "Bath Towel", 495),
        ];

        let store = Store {
            accounts: vec![Account {
                id: UserId::new("u-admin"),
                email: ADMIN_EMAIL.to_owned(),
                password: ADMIN_PASSWORD.to_owned(),
                name: "Platform Admin".to_owned(),
                phone: String::new(),
                role: UserRole::SuperAdmin,
            }],
            businesses: vec![business],
            products,
            next_order_number: FIRST_ORDER_NUMBER,
            ..Store::default()
        };

        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Serve on an ephemeral port and return the API base URL
    /// (`http://127.0.0.1:<port>/api`).
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn(&self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("bind fake backend: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("fake backend address: {e}"));

        let app = Router::new().nest("/api", self.router());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Fake backend stopped: {e}");
            }
        });

        format!("http://{addr}/api")
    }

    /// Make the next order submission fail with `message`.
    pub async fn fail_next_order(&self, message: &str) {
        self.store.lock().await.fail_next_order = Some(message.to_owned());
    }

    /// Make the next admin order listing fail with a server error.
    pub async fn fail_next_listing(&self) {
        self.store.lock().await.fail_next_listing = true;
    }

    /// Every order placed so far, oldest first.
    pub async fn orders(&self) -> Vec<Order> {
        self.store.lock().await.orders.clone()
    }

    /// Register an account with `role` directly and return its id.
    pub async fn add_account(&self, email: &str, password: &str, role: UserRole) -> UserId {
        let id = UserId::new(Uuid::new_v4().to_string());
        self.store.lock().await.accounts.push(Account {
            id: id.clone(),
            email: email.to_owned(),
            password: password.to_owned(),
            name: email.split('@').next().unwrap_or(email).to_owned(),
            phone: String::new(),
            role,
        });
        id
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/auth/me", get(me))
            .route("/pincode/check", post(check_pincode))
            .route("/products", get(products))
            .route("/categories", get(categories))
            .route("/service-types", get(service_types))
            .route("/orders", get(my_orders).post(create_order))
            .route("/orders/{id}", get(my_order))
            .route("/admin/stats", get(admin_stats))
            .route("/admin/businesses", get(admin_businesses).post(create_business))
            .route("/admin/products", get(admin_products).post(create_product))
            .route("/admin/products/{id}", put(update_product).delete(delete_product))
            .route("/admin/services", post(create_service))
            .route("/admin/orders", get(admin_orders))
            .route("/admin/orders/{id}/status", patch(update_order_status))
            .with_state(self.clone())
    }
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct RegisterBody {
    email: String,
    password: String,
    name: String,
    #[serde(default)]
    phone: String,
}

async fn login(State(backend): State<FakeBackend>, Json(body): Json<LoginBody>) -> ApiResult<Value> {
    let mut store = backend.store.lock().await;
    let account = store
        .accounts
        .iter()
        .find(|a| a.email == body.email && a.password == body.password)
        .cloned()
        .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;

    let token = store.issue_token(&account.id);
    Ok(Json(json!({ "token": token, "user": account.user_json() })))
}

async fn register(
    State(backend): State<FakeBackend>,
    Json(body): Json<RegisterBody>,
) -> ApiResult<Value> {
    let mut store = backend.store.lock().await;
    if store.accounts.iter().any(|a| a.email == body.email) {
        return Err(detail(StatusCode::BAD_REQUEST, "Email already registered"));
    }

    let account = Account {
        id: UserId::new(Uuid::new_v4().to_string()),
        email: body.email,
        password: body.password,
        name: body.name,
        phone: body.phone,
        role: UserRole::Customer,
    };
    let token = store.issue_token(&account.id);
    let user = account.user_json();
    store.accounts.push(account);

    Ok(Json(json!({ "token": token, "user": user })))
}

async fn me(State(backend): State<FakeBackend>, headers: HeaderMap) -> ApiResult<Value> {
    let store = backend.store.lock().await;
    Ok(Json(store.account(&headers)?.user_json()))
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Deserialize)]
struct PincodeBody {
    pin_code: String,
}

#[derive(Deserialize)]
struct ProductQuery {
    category: Option<String>,
    subcategory: Option<String>,
    business_id: Option<BusinessId>,
}

async fn check_pincode(
    State(backend): State<FakeBackend>,
    Json(body): Json<PincodeBody>,
) -> Json<PostcodeAvailability> {
    let store = backend.store.lock().await;
    let businesses: Vec<Business> = store
        .businesses
        .iter()
        .filter(|b| b.pin_codes.iter().any(|code| code == &body.pin_code))
        .cloned()
        .collect();

    Json(PostcodeAvailability {
        available: !businesses.is_empty(),
        businesses,
    })
}

async fn products(
    State(backend): State<FakeBackend>,
    Query(query): Query<ProductQuery>,
) -> Json<Vec<Product>> {
    let store = backend.store.lock().await;
    let mut products: Vec<Product> = store
        .products
        .iter()
        .filter(|p| query.category.as_ref().is_none_or(|c| &p.category == c))
        .filter(|p| {
            query
                .subcategory
                .as_ref()
                .is_none_or(|s| p.subcategory.as_ref() == Some(s))
        })
        .filter(|p| query.business_id.as_ref().is_none_or(|b| &p.business_id == b))
        .cloned()
        .collect();

    products.sort_by(|a, b| {
        (a.sort_order.unwrap_or(0), &a.name).cmp(&(b.sort_order.unwrap_or(0), &b.name))
    });
    Json(products)
}

async fn categories(State(backend): State<FakeBackend>) -> Json<Vec<NamedEntry>> {
    let store = backend.store.lock().await;
    let mut names: Vec<String> = store.products.iter().map(|p| p.category.clone()).collect();
    names.sort();
    names.dedup();
    Json(names.into_iter().map(|name| NamedEntry { name }).collect())
}

async fn service_types(State(backend): State<FakeBackend>) -> Json<Vec<NamedEntry>> {
    let store = backend.store.lock().await;
    let mut names: Vec<String> = Vec::new();
    for product in &store.products {
        if !names.contains(&product.service_type) {
            names.push(product.service_type.clone());
        }
    }
    Json(names.into_iter().map(|name| NamedEntry { name }).collect())
}

// =============================================================================
// Orders
// =============================================================================

async fn create_order(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<NewOrder>,
) -> ApiResult<Value> {
    let mut store = backend.store.lock().await;
    let account = store.account(&headers)?;

    if body.total_amount < MINIMUM_ORDER {
        return Err(detail(StatusCode::BAD_REQUEST, "Minimum order value is £30"));
    }
    if let Some(message) = store.fail_next_order.take() {
        return Err(detail(StatusCode::BAD_REQUEST, &message));
    }

    let order_number = store.next_order_number;
    store.next_order_number += 1;

    let order = Order {
        id: OrderId::new(Uuid::new_v4().to_string()),
        order_number: Some(order_number),
        user_id: account.id,
        user_name: Some(account.name),
        user_email: Some(account.email),
        items: body.items,
        pickup_date: body.pickup_date.to_string(),
        pickup_time: body.pickup_time.as_str().to_owned(),
        pickup_instruction: Some(body.pickup_instruction.as_str().to_owned()),
        delivery_date: body.delivery_date.to_string(),
        delivery_time: body.delivery_time.as_str().to_owned(),
        delivery_instruction: Some(body.delivery_instruction.as_str().to_owned()),
        address: body.address,
        pin_code: body.pin_code,
        payment_method: body.payment_method,
        payment_status: PaymentStatus::Cod,
        total_amount: body.total_amount,
        status: OrderStatus::Pending,
        created_at: Some(Utc::now()),
    };
    let order_id = order.id.clone();
    store.orders.push(order);

    Ok(Json(json!({
        "order_id": order_id,
        "order_number": order_number,
        "status": "success",
    })))
}

async fn my_orders(State(backend): State<FakeBackend>, headers: HeaderMap) -> ApiResult<Vec<Order>> {
    let store = backend.store.lock().await;
    let account = store.account(&headers)?;
    let mut orders: Vec<Order> = store
        .orders
        .iter()
        .filter(|o| o.user_id == account.id)
        .cloned()
        .collect();
    orders.reverse();
    Ok(Json(orders))
}

async fn my_order(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<OrderId>,
) -> ApiResult<Order> {
    let store = backend.store.lock().await;
    let account = store.account(&headers)?;
    let order = store
        .orders
        .iter()
        .find(|o| o.id == id)
        .cloned()
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Order not found"))?;

    if order.user_id != account.id && !account.role.is_admin() {
        return Err(detail(StatusCode::FORBIDDEN, "Access denied"));
    }
    Ok(Json(order))
}

// =============================================================================
// Admin
// =============================================================================

async fn admin_stats(State(backend): State<FakeBackend>, headers: HeaderMap) -> ApiResult<AdminStats> {
    let store = backend.store.lock().await;
    store.admin(&headers)?;
    Ok(Json(AdminStats {
        total_orders: store.orders.len() as u64,
        total_revenue: store.orders.iter().map(|o| o.total_amount).sum(),
        total_businesses: store.businesses.len() as u64,
        total_products: store.products.len() as u64,
    }))
}

async fn admin_businesses(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
) -> ApiResult<Vec<Business>> {
    let store = backend.store.lock().await;
    store.admin(&headers)?;
    Ok(Json(store.businesses.clone()))
}

async fn create_business(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<NewBusiness>,
) -> ApiResult<Value> {
    let mut store = backend.store.lock().await;
    let admin = store.admin(&headers)?;
    if !admin.role.can_manage_businesses() {
        return Err(detail(StatusCode::FORBIDDEN, "Platform admin access required"));
    }

    let id = BusinessId::new(Uuid::new_v4().to_string());
    store.businesses.push(Business {
        id: id.clone(),
        name: body.name,
        owner_email: body.owner_email,
        pin_codes: body.pin_codes,
        created_at: Some(Utc::now()),
    });
    Ok(Json(json!({ "business_id": id, "status": "success" })))
}

async fn admin_products(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
) -> ApiResult<Vec<Product>> {
    let store = backend.store.lock().await;
    store.admin(&headers)?;
    Ok(Json(store.products.clone()))
}

fn product_from(id: ProductId, business: &Business, input: ProductInput) -> Product {
    Product {
        id,
        business_id: business.id.clone(),
        business_name: business.name.clone(),
        service_type: input.service_type,
        category: input.category,
        subcategory: input.subcategory,
        name: input.name,
        price: input.price,
        icon_url: input.icon_url,
        sort_order: input.sort_order,
    }
}

async fn create_product(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<ProductInput>,
) -> ApiResult<Value> {
    let mut store = backend.store.lock().await;
    store.admin(&headers)?;
    let business = store.business(&body.business_id)?;

    let id = ProductId::new(Uuid::new_v4().to_string());
    store.products.push(product_from(id.clone(), &business, body));
    Ok(Json(json!({ "product_id": id, "status": "success" })))
}

async fn update_product(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
    Json(body): Json<ProductInput>,
) -> ApiResult<Value> {
    let mut store = backend.store.lock().await;
    store.admin(&headers)?;
    let business = store.business(&body.business_id)?;

    let slot = store
        .products
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Product not found"))?;
    let sort_order = body.sort_order.or(slot.sort_order);
    *slot = Product {
        sort_order,
        ..product_from(id, &business, body)
    };
    Ok(Json(json!({ "status": "success" })))
}

async fn delete_product(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
) -> ApiResult<Value> {
    let mut store = backend.store.lock().await;
    store.admin(&headers)?;

    let before = store.products.len();
    store.products.retain(|p| p.id != id);
    if store.products.len() == before {
        return Err(detail(StatusCode::NOT_FOUND, "Product not found"));
    }
    Ok(Json(json!({ "status": "success" })))
}

async fn create_service(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<NewService>,
) -> ApiResult<Value> {
    let mut store = backend.store.lock().await;
    store.admin(&headers)?;
    store.business(&body.business_id)?;
    store.services.push(body);
    Ok(Json(json!({ "status": "success" })))
}

async fn admin_orders(State(backend): State<FakeBackend>, headers: HeaderMap) -> ApiResult<Vec<Order>> {
    let mut store = backend.store.lock().await;
    store.admin(&headers)?;
    if std::mem::take(&mut store.fail_next_listing) {
        return Err(detail(StatusCode::SERVICE_UNAVAILABLE, "Database unavailable"));
    }
    let mut orders = store.orders.clone();
    orders.reverse();
    Ok(Json(orders))
}

async fn update_order_status(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusUpdate>,
) -> ApiResult<Value> {
    let mut store = backend.store.lock().await;
    store.admin(&headers)?;

    let order = store
        .orders
        .iter_mut()
        .find(|o| o.id == id)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Order not found"))?;
    order.status = body.status;
    Ok(Json(json!({ "status": "success" })))
}
