//! Shopper journeys through the storefront against the fake backend.

#![allow(clippy::unwrap_used)]

use freshfold_core::{CheckoutDraft, OrderStatus, Postcode};
use freshfold_integration_tests::backend::SERVED_POSTCODE;
use freshfold_integration_tests::harness::{Browser, TestEnv, location, text};
use reqwest::StatusCode;

fn checkout_form() -> freshfold_core::checkout::CheckoutForm {
    let postcode = Postcode::parse(SERVED_POSTCODE).unwrap();
    let mut form =
        CheckoutDraft::with_defaults(chrono::Local::now().date_naive(), Some(&postcode)).to_form();
    form.address = "1 High Street, Colchester".to_owned();
    form
}

async fn signed_in_shopper(env: &TestEnv, email: &str) -> Browser {
    let shopper = env.shopper();
    shopper.sign_up(email).await;
    shopper.unlock().await;
    shopper
}

#[tokio::test]
async fn test_catalog_is_locked_until_postcode_is_served() {
    let env = TestEnv::start().await;
    let shopper = env.shopper();

    let response = shopper.get("/services").await;
    assert_eq!(location(&response), "/");

    let response = shopper.post("/postcode", &[("pin_code", "ZZ9")]).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(text(response).await.contains("Service not available in your area yet"));
    assert_eq!(location(&shopper.get("/services").await), "/");

    shopper.unlock().await;
    let page = shopper.page("/services").await;
    assert!(page.contains("Service is available!"));
    assert!(page.contains("Double Duvet"));
}

#[tokio::test]
async fn test_cart_add_requires_postcode() {
    let env = TestEnv::start().await;
    let shopper = env.shopper();

    let response = shopper.post("/cart/add", &[("product_id", "p-duvet")]).await;
    assert_eq!(location(&response), "/");

    let response = shopper
        .htmx_post("/cart/add", &[("product_id", "p-duvet")])
        .await;
    assert_eq!(response.headers()["hx-redirect"], "/");

    assert!(shopper.page("/cart/count").await.contains(">0</span>"));
}

#[tokio::test]
async fn test_unserved_postcode_relocks_catalog() {
    let env = TestEnv::start().await;
    let shopper = env.shopper();
    shopper.unlock().await;
    assert_eq!(shopper.get("/services").await.status(), StatusCode::OK);

    let response = shopper.post("/postcode", &[("pin_code", "ZZ9")]).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(location(&shopper.get("/services").await), "/");
    let response = shopper.post("/cart/add", &[("product_id", "p-shirt")]).await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_adding_twice_increments_quantity() {
    let env = TestEnv::start().await;
    let shopper = signed_in_shopper(&env, "twice@example.com").await;

    shopper.add_to_cart("p-shirt").await;
    shopper.add_to_cart("p-shirt").await;

    assert!(shopper.page("/cart/count").await.contains(">2</span>"));
    let cart = shopper.page("/cart").await;
    assert_eq!(cart.matches("<span class=\"product-name\">Shirt</span>").count(), 1);
    assert!(cart.contains("<span>2</span>"));
    assert!(cart.contains("£9.90"));
}

#[tokio::test]
async fn test_decrement_to_zero_removes_line() {
    let env = TestEnv::start().await;
    let shopper = signed_in_shopper(&env, "zero@example.com").await;

    shopper.add_to_cart("p-shirt").await;
    shopper.adjust("p-shirt", -1).await;

    assert!(shopper.page("/cart/count").await.contains(">0</span>"));
    assert!(shopper.page("/cart").await.contains("Your cart is empty."));
}

#[tokio::test]
async fn test_below_minimum_blocks_checkout() {
    let env = TestEnv::start().await;
    let shopper = signed_in_shopper(&env, "small@example.com").await;

    shopper.add_to_cart("p-shirt").await;
    shopper.add_to_cart("p-shirt").await;

    let cart = shopper.page("/cart").await;
    assert!(cart.contains("Minimum order value is £30.00. Add £20.10 more to checkout."));
    assert!(cart.contains("disabled"));

    assert_eq!(location(&shopper.get("/checkout").await), "/cart");
    let response = shopper.post("/checkout", &checkout_form()).await;
    assert_eq!(location(&response), "/cart");
    assert!(env.backend.orders().await.is_empty());
}

#[tokio::test]
async fn test_checkout_with_empty_cart_goes_to_catalog() {
    let env = TestEnv::start().await;
    let shopper = signed_in_shopper(&env, "empty@example.com").await;

    assert_eq!(location(&shopper.get("/checkout").await), "/services");
}

#[tokio::test]
async fn test_checkout_requires_sign_in() {
    let env = TestEnv::start().await;
    let shopper = env.shopper();
    shopper.unlock().await;

    let response = shopper.get("/checkout").await;
    assert!(location(&response).starts_with("/auth/login"));
}

#[tokio::test]
async fn test_successful_checkout_clears_cart() {
    let env = TestEnv::start().await;
    let shopper = signed_in_shopper(&env, "happy@example.com").await;

    shopper.add_to_cart("p-duvet").await;
    shopper.add_to_cart("p-duvet").await;
    assert_eq!(shopper.get("/checkout").await.status(), StatusCode::OK);

    let response = shopper.post("/checkout", &checkout_form()).await;
    let destination = location(&response);
    assert!(destination.starts_with("/orders/"), "{destination}");
    assert!(destination.ends_with("/confirmation"));

    let orders = env.backend.orders().await;
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.order_number, Some(100_000));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.item_count(), 2);
    assert_eq!(order.total_amount.to_string(), "£31.90");
    assert_eq!(order.pin_code, SERVED_POSTCODE);

    let confirmation = shopper.page(&destination).await;
    assert!(confirmation.contains("Order placed successfully!"));
    assert!(confirmation.contains("Order #100000"));

    assert!(shopper.page("/cart/count").await.contains(">0</span>"));
    assert!(shopper.page("/dashboard").await.contains("100000"));
}

#[tokio::test]
async fn test_failed_order_keeps_cart_and_shows_reason() {
    let env = TestEnv::start().await;
    let shopper = signed_in_shopper(&env, "unlucky@example.com").await;

    shopper.add_to_cart("p-duvet").await;
    shopper.add_to_cart("p-duvet").await;
    env.backend.fail_next_order("Pickup slot no longer available").await;

    let response = shopper.post("/checkout", &checkout_form()).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(text(response).await.contains("Pickup slot no longer available"));

    assert!(env.backend.orders().await.is_empty());
    assert!(shopper.page("/cart/count").await.contains(">2</span>"));
}

#[tokio::test]
async fn test_duplicate_registration_is_refused() {
    let env = TestEnv::start().await;
    env.shopper().sign_up("taken@example.com").await;

    let response = env
        .shopper()
        .post(
            "/auth/register",
            &[
                ("name", "Someone Else"),
                ("email", "taken@example.com"),
                ("phone", ""),
                ("password", "password123"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(text(response).await.contains("Email already registered"));
}
