//! Operator journeys through the admin console against the fake backend.

#![allow(clippy::unwrap_used)]

use freshfold_core::{CheckoutDraft, OrderStatus, Postcode, UserRole};
use freshfold_integration_tests::backend::{ADMIN_EMAIL, ADMIN_PASSWORD, SERVED_POSTCODE};
use freshfold_integration_tests::harness::{Browser, TestEnv, location, text};
use reqwest::StatusCode;

async fn operator(env: &TestEnv) -> Browser {
    let operator = env.operator();
    let response = operator.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(location(&response), "/");
    operator
}

async fn place_order(env: &TestEnv) -> String {
    let shopper = env.shopper();
    shopper.sign_up("customer@example.com").await;
    shopper.unlock().await;
    shopper.add_to_cart("p-duvet").await;
    shopper.add_to_cart("p-duvet").await;

    let postcode = Postcode::parse(SERVED_POSTCODE).unwrap();
    let mut form =
        CheckoutDraft::with_defaults(chrono::Local::now().date_naive(), Some(&postcode)).to_form();
    form.address = "1 High Street, Colchester".to_owned();
    let response = shopper.post("/checkout", &form).await;
    assert!(location(&response).ends_with("/confirmation"));

    env.backend.orders().await.remove(0).id.to_string()
}

#[tokio::test]
async fn test_customer_cannot_sign_in() {
    let env = TestEnv::start().await;
    env.backend
        .add_account("shopper@example.com", "password123", UserRole::Customer)
        .await;

    let response = env
        .operator()
        .sign_in("shopper@example.com", "password123")
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(text(response).await.contains("Admin access required"));
}

#[tokio::test]
async fn test_wrong_password_shows_backend_reason() {
    let env = TestEnv::start().await;

    let response = env.operator().sign_in(ADMIN_EMAIL, "wrong").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(text(response).await.contains("Invalid credentials"));
}

#[tokio::test]
async fn test_status_update_is_reflected_in_listing() {
    let env = TestEnv::start().await;
    let order_id = place_order(&env).await;
    let operator = operator(&env).await;

    let listing = operator.page("/orders").await;
    assert!(listing.contains("#100000"));
    assert!(listing.contains("value=\"pending\" selected"));

    let response = operator
        .htmx_post(
            &format!("/orders/{order_id}/status"),
            &[("status", "completed")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let row = text(response).await;
    assert!(row.contains(&format!("<tr id=\"order-{order_id}\">")));
    assert!(row.contains("value=\"completed\" selected"));

    assert_eq!(env.backend.orders().await[0].status, OrderStatus::Completed);
    let listing = operator.page("/orders").await;
    assert!(listing.contains("value=\"completed\" selected"));
}

#[tokio::test]
async fn test_status_update_survives_failed_reload() {
    let env = TestEnv::start().await;
    let order_id = place_order(&env).await;
    let operator = operator(&env).await;

    env.backend.fail_next_listing().await;
    let response = operator
        .htmx_post(
            &format!("/orders/{order_id}/status"),
            &[("status", "confirmed")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let trigger = response.headers()["hx-trigger"].to_str().unwrap().to_owned();
    assert!(trigger.contains("Order status updated"), "{trigger}");

    assert_eq!(env.backend.orders().await[0].status, OrderStatus::Confirmed);
}

#[tokio::test]
async fn test_dashboard_shows_stats() {
    let env = TestEnv::start().await;
    place_order(&env).await;
    let operator = operator(&env).await;

    let dashboard = operator.page("/").await;
    assert!(dashboard.contains("Login successful!"));
    assert!(dashboard.contains("£31.90"));
}

#[tokio::test]
async fn test_product_lifecycle() {
    let env = TestEnv::start().await;
    let operator = operator(&env).await;

    let response = operator
        .post(
            "/products",
            &[
                ("business_id", "b-bubbles"),
                ("service_type", "Ironing"),
                ("category", "Shirts"),
                ("subcategory", ""),
                ("name", "Ironed Shirt"),
                ("price", "2.50"),
                ("icon_url", ""),
                ("sort_order", ""),
            ],
        )
        .await;
    assert_eq!(location(&response), "/products");

    let listing = operator.page("/products").await;
    assert!(listing.contains("Product created successfully"));
    assert!(listing.contains("Ironed Shirt"));
    assert!(listing.contains("Ironing &gt; Shirts") || listing.contains("Ironing > Shirts"));

    let response = operator
        .htmx_post("/products/p-shirt/delete", &[("id", "p-shirt")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.is_empty());
    let listing = operator.page("/products").await;
    assert!(!listing.contains("id=\"product-p-shirt\""));
    assert!(listing.contains("id=\"product-p-coat\""));
}

#[tokio::test]
async fn test_product_for_unknown_business_is_rejected() {
    let env = TestEnv::start().await;
    let operator = operator(&env).await;

    let response = operator
        .post(
            "/products",
            &[
                ("business_id", "b-missing"),
                ("service_type", "Ironing"),
                ("category", "Shirts"),
                ("name", "Ironed Shirt"),
                ("price", "2.50"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(text(response).await.contains("Business not found"));
}

#[tokio::test]
async fn test_new_business_serves_its_postcodes() {
    let env = TestEnv::start().await;
    let operator = operator(&env).await;

    let response = operator
        .post(
            "/businesses",
            &[
                ("name", "Suds & Co"),
                ("owner_email", "owner@suds.test"),
                ("pin_codes", "IP1, IP2"),
            ],
        )
        .await;
    assert!(response.status().is_redirection());

    let shopper = env.shopper();
    let response = shopper.post("/postcode", &[("pin_code", "IP2")]).await;
    assert_eq!(location(&response), "/services");
}
