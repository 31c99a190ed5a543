//! Checkout: slot selection, address and order submission.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Local;
use freshfold_core::checkout::CheckoutForm;
use freshfold_core::{
    Cart, CheckoutDraft, DeliveryInstruction, PaymentMethod, PickupInstruction, TimeSlot,
};
use tracing::instrument;

use super::Layout;
use super::cart::CartView;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{LOGIN_REQUIRED, RequireAuth, SessionContext};
use crate::models::Flash;
use crate::state::AppState;

/// Fallback when the backend gives no reason for refusing an order.
pub const ORDER_FAILED: &str = "Failed to place order";

/// One `<option>` or radio choice.
#[derive(Debug, Clone)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
    pub disabled: bool,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub cart: CartView,
    pub form: CheckoutForm,
    /// Earliest selectable date (`YYYY-MM-DD`).
    pub min_date: String,
    pub pickup_times: Vec<Choice>,
    pub delivery_times: Vec<Choice>,
    pub pickup_instructions: Vec<Choice>,
    pub delivery_instructions: Vec<Choice>,
    pub payment_methods: Vec<Choice>,
    pub error: Option<String>,
}

impl CheckoutTemplate {
    fn new(layout: Layout, cart: &Cart, form: CheckoutForm, error: Option<String>) -> Self {
        Self {
            layout,
            cart: CartView::from(cart),
            min_date: today().to_string(),
            pickup_times: slot_choices(&form.pickup_time),
            delivery_times: slot_choices(&form.delivery_time),
            pickup_instructions: PickupInstruction::ALL
                .iter()
                .map(|i| choice(i.as_str(), i.label(), &form.pickup_instruction))
                .collect(),
            delivery_instructions: DeliveryInstruction::ALL
                .iter()
                .map(|i| choice(i.as_str(), i.label(), &form.delivery_instruction))
                .collect(),
            payment_methods: PaymentMethod::ALL
                .iter()
                .map(|m| Choice {
                    disabled: !m.is_available(),
                    ..choice(m.as_str(), m.label(), &form.payment_method)
                })
                .collect(),
            form,
            error,
        }
    }
}

fn choice(value: &'static str, label: &'static str, current: &str) -> Choice {
    Choice {
        value,
        label,
        selected: value == current,
        disabled: false,
    }
}

fn slot_choices(current: &str) -> Vec<Choice> {
    TimeSlot::ALL
        .iter()
        .map(|s| choice(s.as_str(), s.label(), current))
        .collect()
}

fn today() -> chrono::NaiveDate {
    Local::now().date_naive()
}

/// Where to send a cart that cannot be checked out, if anywhere.
fn guard(cart: &Cart) -> Option<Redirect> {
    if cart.is_empty() {
        Some(Redirect::to("/services"))
    } else if !cart.checkout_gate().is_ready() {
        Some(Redirect::to("/cart"))
    } else {
        None
    }
}

/// Display the checkout form with scheduling defaults.
#[instrument(skip(state, ctx, _auth))]
pub async fn show(
    State(state): State<AppState>,
    ctx: SessionContext,
    _auth: RequireAuth,
) -> Result<Response, AppError> {
    let cart = ctx.cart().await?;
    if let Some(redirect) = guard(&cart) {
        return Ok(redirect.into_response());
    }

    let postcode = ctx.postcode().await?;
    let form = CheckoutDraft::with_defaults(today(), postcode.as_ref()).to_form();
    let layout = Layout::load(&state, &ctx).await?;

    Ok(CheckoutTemplate::new(layout, &cart, form, None).into_response())
}

/// Place the order.
///
/// On success the cart is cleared and the browser goes to the
/// confirmation page. On failure the form is shown again with the reason
/// and the cart is left untouched.
#[instrument(skip(state, ctx, signed_in, form), fields(user_id = %signed_in.user.id))]
pub async fn submit(
    State(state): State<AppState>,
    ctx: SessionContext,
    RequireAuth(signed_in): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Response, AppError> {
    let mut cart = ctx.cart().await?;
    if let Some(redirect) = guard(&cart) {
        return Ok(redirect.into_response());
    }

    let order = match CheckoutDraft::from_form(&form).and_then(|draft| draft.into_order(&cart)) {
        Ok(order) => order,
        Err(e) => return rejected(&state, &ctx, &cart, form, e.to_string()).await,
    };

    match state
        .api()
        .authorized(&signed_in.token)
        .create_order(&order)
        .await
    {
        Ok(created) => {
            cart.clear();
            ctx.save_cart(&cart).await?;
            state.cart_events().publish(ctx.cart_key().await?, 0);
            ctx.flash(Flash::success("Order placed successfully!"))
                .await?;
            add_breadcrumb(
                "checkout",
                "Order placed",
                Some(&[("order_id", created.order_id.as_str())]),
            );
            Ok(Redirect::to(&format!("/orders/{}/confirmation", created.order_id)).into_response())
        }
        Err(e) if e.is_unauthorized() => {
            tracing::info!("Token rejected at checkout, signing out");
            ctx.sign_out().await?;
            ctx.flash(Flash::info(LOGIN_REQUIRED)).await?;
            Ok(Redirect::to("/auth/login?next=%2Fcheckout").into_response())
        }
        Err(e) => {
            tracing::warn!("Order submission failed: {e}");
            let message = if e.is_transport() {
                ORDER_FAILED.to_string()
            } else {
                e.user_message(ORDER_FAILED)
            };
            rejected(&state, &ctx, &cart, form, message).await
        }
    }
}

async fn rejected(
    state: &AppState,
    ctx: &SessionContext,
    cart: &Cart,
    form: CheckoutForm,
    error: String,
) -> Result<Response, AppError> {
    let layout = Layout::load(state, ctx).await?;
    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        CheckoutTemplate::new(layout, cart, form, Some(error)),
    )
        .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use freshfold_core::{BusinessId, CartItem, Money, ProductId};

    use super::*;

    fn cart_worth(pence: i64) -> Cart {
        let mut cart = Cart::new();
        cart.add(CartItem {
            product_id: ProductId::new("p1"),
            product_name: "Duvet".to_string(),
            category: "Bedding".to_string(),
            subcategory: None,
            business_id: BusinessId::new("b1"),
            business_name: "Bubbles".to_string(),
            price: Money::from_pence(pence),
            quantity: 1,
        });
        cart
    }

    fn location(redirect: Redirect) -> String {
        redirect
            .into_response()
            .headers()
            .get("location")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_guard_empty_cart_goes_to_catalog() {
        assert_eq!(location(guard(&Cart::new()).unwrap()), "/services");
    }

    #[test]
    fn test_guard_below_minimum_goes_to_cart() {
        assert_eq!(location(guard(&cart_worth(2999)).unwrap()), "/cart");
    }

    #[test]
    fn test_guard_allows_minimum() {
        assert!(guard(&cart_worth(3000)).is_none());
    }

    #[test]
    fn test_choices_mark_selection() {
        let form = CheckoutDraft::with_defaults(today(), None).to_form();
        let template = CheckoutTemplate::new(Layout::default(), &cart_worth(3000), form, None);

        let selected: Vec<_> = template
            .pickup_times
            .iter()
            .filter(|c| c.selected)
            .map(|c| c.value)
            .collect();
        assert_eq!(selected, ["10:00-12:00"]);

        let stripe = template
            .payment_methods
            .iter()
            .find(|c| c.value == "stripe")
            .unwrap();
        assert!(stripe.disabled);
    }
}
