//! Checkout draft: scheduling defaults, form parsing and order assembly.
//!
//! Validation here is advisory. It catches obvious mistakes before a round
//! trip, but the backend remains the authority and may still reject the
//! order (its message is then shown to the customer verbatim).

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CheckoutGate, MINIMUM_ORDER};
use crate::models::NewOrder;
use crate::types::{
    DeliveryInstruction, Money, PaymentMethod, PickupInstruction, Postcode, PostcodeError,
    TimeSlot, UnknownOption,
};

/// Days between the default pickup and the default delivery.
pub const DEFAULT_TURNAROUND_DAYS: u64 = 2;

/// Reasons a checkout cannot be submitted.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,
    #[error("Minimum order value is {min}. Add {shortfall} more to checkout.", min = MINIMUM_ORDER)]
    BelowMinimum { shortfall: Money },
    #[error("Please enter a valid {field} date")]
    InvalidDate { field: &'static str },
    #[error("Please choose a valid {}", .0.kind)]
    InvalidOption(#[from] UnknownOption),
    #[error("Please enter your full address")]
    MissingAddress,
    #[error(transparent)]
    Postcode(#[from] PostcodeError),
    #[error("Delivery date cannot be before the collection date")]
    DeliveryBeforePickup,
    #[error("{} is coming soon. Please choose cash on delivery.", .0.label())]
    PaymentUnavailable(PaymentMethod),
}

/// Raw checkout form fields as posted by the browser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub pickup_date: String,
    pub pickup_time: String,
    pub pickup_instruction: String,
    pub delivery_date: String,
    pub delivery_time: String,
    pub delivery_instruction: String,
    pub address: String,
    pub pin_code: String,
    pub payment_method: String,
}

/// Checkout fields with typed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutDraft {
    pub pickup_date: NaiveDate,
    pub pickup_time: TimeSlot,
    pub pickup_instruction: PickupInstruction,
    pub delivery_date: NaiveDate,
    pub delivery_time: TimeSlot,
    pub delivery_instruction: DeliveryInstruction,
    pub address: String,
    pub pin_code: String,
    pub payment_method: PaymentMethod,
}

impl CheckoutDraft {
    /// Pre-filled draft: collect today 10:00-12:00 in person, deliver two
    /// days later 14:00-16:00 ring-and-wait, cash on delivery.
    #[must_use]
    pub fn with_defaults(today: NaiveDate, postcode: Option<&Postcode>) -> Self {
        Self {
            pickup_date: today,
            pickup_time: TimeSlot::TenToNoon,
            pickup_instruction: PickupInstruction::InPerson,
            delivery_date: today
                .checked_add_days(Days::new(DEFAULT_TURNAROUND_DAYS))
                .unwrap_or(today),
            delivery_time: TimeSlot::TwoToFour,
            delivery_instruction: DeliveryInstruction::RingWait,
            address: String::new(),
            pin_code: postcode.map(|p| p.as_str().to_owned()).unwrap_or_default(),
            payment_method: PaymentMethod::Cod,
        }
    }

    /// Parse and validate a posted form.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, in form order.
    pub fn from_form(form: &CheckoutForm) -> Result<Self, CheckoutError> {
        let pickup_date = parse_date(&form.pickup_date, "collection")?;
        let pickup_time: TimeSlot = form.pickup_time.parse()?;
        let pickup_instruction: PickupInstruction = form.pickup_instruction.parse()?;
        let delivery_date = parse_date(&form.delivery_date, "delivery")?;
        let delivery_time: TimeSlot = form.delivery_time.parse()?;
        let delivery_instruction: DeliveryInstruction = form.delivery_instruction.parse()?;

        let address = form.address.trim();
        if address.is_empty() {
            return Err(CheckoutError::MissingAddress);
        }
        let pin_code = Postcode::parse(&form.pin_code)?;

        if delivery_date < pickup_date {
            return Err(CheckoutError::DeliveryBeforePickup);
        }

        let payment_method: PaymentMethod = form.payment_method.parse()?;
        if !payment_method.is_available() {
            return Err(CheckoutError::PaymentUnavailable(payment_method));
        }

        Ok(Self {
            pickup_date,
            pickup_time,
            pickup_instruction,
            delivery_date,
            delivery_time,
            delivery_instruction,
            address: address.to_owned(),
            pin_code: pin_code.as_str().to_owned(),
            payment_method,
        })
    }

    /// Raw form values for re-rendering the form.
    #[must_use]
    pub fn to_form(&self) -> CheckoutForm {
        CheckoutForm {
            pickup_date: self.pickup_date.to_string(),
            pickup_time: self.pickup_time.as_str().to_owned(),
            pickup_instruction: self.pickup_instruction.as_str().to_owned(),
            delivery_date: self.delivery_date.to_string(),
            delivery_time: self.delivery_time.as_str().to_owned(),
            delivery_instruction: self.delivery_instruction.as_str().to_owned(),
            address: self.address.clone(),
            pin_code: self.pin_code.clone(),
            payment_method: self.payment_method.as_str().to_owned(),
        }
    }

    /// Snapshot `cart` into an order request.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] or [`CheckoutError::BelowMinimum`]
    /// when the cart cannot be checked out.
    pub fn into_order(self, cart: &Cart) -> Result<NewOrder, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if let CheckoutGate::BelowMinimum { shortfall } = cart.checkout_gate() {
            return Err(CheckoutError::BelowMinimum { shortfall });
        }

        Ok(NewOrder {
            items: cart.items().to_vec(),
            pickup_date: self.pickup_date,
            pickup_time: self.pickup_time,
            pickup_instruction: self.pickup_instruction,
            delivery_date: self.delivery_date,
            delivery_time: self.delivery_time,
            delivery_instruction: self.delivery_instruction,
            address: self.address,
            pin_code: self.pin_code,
            payment_method: self.payment_method,
            total_amount: cart.total(),
        })
    }
}

fn parse_date(raw: &str, field: &'static str) -> Result<NaiveDate, CheckoutError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| CheckoutError::InvalidDate { field })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::CartItem;
    use crate::types::{BusinessId, ProductId};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn cart_worth(pence: i64) -> Cart {
        let mut cart = Cart::new();
        cart.add(CartItem {
            product_id: ProductId::new("p1"),
            product_name: "Duvet".to_owned(),
            category: "Bedding".to_owned(),
            subcategory: None,
            business_id: BusinessId::new("b1"),
            business_name: "Bubbles".to_owned(),
            price: Money::from_pence(pence),
            quantity: 1,
        });
        cart
    }

    fn valid_form() -> CheckoutForm {
        let postcode = Postcode::parse("e14").unwrap();
        let mut form = CheckoutDraft::with_defaults(today(), Some(&postcode)).to_form();
        form.address = "1 Canada Square".to_owned();
        form
    }

    #[test]
    fn test_defaults() {
        let postcode = Postcode::parse("sw1a").unwrap();
        let draft = CheckoutDraft::with_defaults(today(), Some(&postcode));

        assert_eq!(draft.pickup_date, today());
        assert_eq!(draft.pickup_time, TimeSlot::TenToNoon);
        assert_eq!(draft.pickup_instruction, PickupInstruction::InPerson);
        assert_eq!(
            draft.delivery_date,
            NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()
        );
        assert_eq!(draft.delivery_time, TimeSlot::TwoToFour);
        assert_eq!(draft.delivery_instruction, DeliveryInstruction::RingWait);
        assert_eq!(draft.payment_method, PaymentMethod::Cod);
        assert_eq!(draft.pin_code, "SW1A");
    }

    #[test]
    fn test_from_form_accepts_defaults() {
        let draft = CheckoutDraft::from_form(&valid_form()).unwrap();
        assert_eq!(draft.address, "1 Canada Square");
        assert_eq!(draft.pin_code, "E14");
    }

    #[test]
    fn test_from_form_requires_address() {
        let mut form = valid_form();
        form.address = "   ".to_owned();
        assert_eq!(
            CheckoutDraft::from_form(&form),
            Err(CheckoutError::MissingAddress)
        );
    }

    #[test]
    fn test_from_form_rejects_bad_date() {
        let mut form = valid_form();
        form.delivery_date = "next tuesday".to_owned();
        assert_eq!(
            CheckoutDraft::from_form(&form),
            Err(CheckoutError::InvalidDate { field: "delivery" })
        );
    }

    #[test]
    fn test_from_form_rejects_delivery_before_pickup() {
        let mut form = valid_form();
        form.delivery_date = "2026-10-17".to_owned();
        assert_eq!(
            CheckoutDraft::from_form(&form),
            Err(CheckoutError::DeliveryBeforePickup)
        );
    }

    #[test]
    fn test_from_form_rejects_unknown_slot() {
        let mut form = valid_form();
        form.pickup_time = "03:00-05:00".to_owned();
        let err = CheckoutDraft::from_form(&form).unwrap_err();
        assert_eq!(err.to_string(), "Please choose a valid time slot");
    }

    #[test]
    fn test_card_payment_is_refused() {
        let mut form = valid_form();
        form.payment_method = "stripe".to_owned();
        assert_eq!(
            CheckoutDraft::from_form(&form),
            Err(CheckoutError::PaymentUnavailable(PaymentMethod::Stripe))
        );
    }

    #[test]
    fn test_unknown_payment_method_is_rejected() {
        let mut form = valid_form();
        form.payment_method = "bitcoin".to_owned();
        let err = CheckoutDraft::from_form(&form).unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidOption(_)));
        assert_eq!(err.to_string(), "Please choose a valid payment method");
    }

    #[test]
    fn test_into_order_snapshots_cart() {
        let cart = cart_worth(3200);
        let order = CheckoutDraft::from_form(&valid_form())
            .unwrap()
            .into_order(&cart)
            .unwrap();
        assert_eq!(order.items, cart.items());
        assert_eq!(order.total_amount, Money::from_pence(3200));
    }

    #[test]
    fn test_into_order_below_minimum() {
        let err = CheckoutDraft::with_defaults(today(), None)
            .into_order(&cart_worth(2500))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Minimum order value is £30.00. Add £5.00 more to checkout."
        );
    }

    #[test]
    fn test_below_minimum_message_follows_threshold() {
        let err = CheckoutError::BelowMinimum {
            shortfall: Money::from_pence(1),
        };
        assert!(
            err.to_string()
                .starts_with(&format!("Minimum order value is {MINIMUM_ORDER}."))
        );
    }

    #[test]
    fn test_into_order_empty_cart() {
        assert_eq!(
            CheckoutDraft::with_defaults(today(), None).into_order(&Cart::new()),
            Err(CheckoutError::EmptyCart)
        );
    }
}
