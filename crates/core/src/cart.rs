//! Session-held cart and the minimum-order gate.
//!
//! The cart is an ordered list of lines owned by one browser session. It is
//! never sent to the backend until checkout. Display fields (name, category,
//! business, price) are captured when a line is first added and are not
//! refreshed afterwards; the backend re-checks the order total on submit.
//!
//! Invariant: every line has `quantity >= 1`. Any operation that would take
//! a line to zero removes it instead.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Product;
use crate::types::{BusinessId, Money, ProductId};

/// Smallest order total that can be checked out.
pub const MINIMUM_ORDER: Money = Money::new(Decimal::from_parts(30, 0, 0, false, 0));

/// One cart line, in the shape `POST /orders` expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub business_id: BusinessId,
    pub business_name: String,
    pub price: Money,
    pub quantity: u32,
}

impl CartItem {
    /// A single-quantity line for `product`, locking in its current price.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            category: product.category.clone(),
            subcategory: product.subcategory.clone(),
            business_id: product.business_id.clone(),
            business_name: product.business_name.clone(),
            price: product.price,
            quantity: 1,
        }
    }

    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

/// Whether a cart may proceed to checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutGate {
    Ready,
    /// The total is under [`MINIMUM_ORDER`] by `shortfall`.
    BelowMinimum { shortfall: Money },
}

impl CheckoutGate {
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// The session cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    /// Add `item` to the cart.
    ///
    /// If the product is already present its quantity grows by
    /// `item.quantity` and the existing display fields are kept. Returns the
    /// resulting quantity of that line.
    pub fn add(&mut self, item: CartItem) -> u32 {
        if item.quantity == 0 {
            return self.get(&item.product_id).map_or(0, |line| line.quantity);
        }
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.product_id == item.product_id)
        {
            line.quantity = line.quantity.saturating_add(item.quantity);
            return line.quantity;
        }
        let quantity = item.quantity;
        self.items.push(item);
        quantity
    }

    /// Change a line's quantity by `delta`, clamping at zero.
    ///
    /// A result of zero removes the line. Returns the new quantity, or `None`
    /// if the product is not in the cart.
    pub fn adjust(&mut self, product_id: &ProductId, delta: i32) -> Option<u32> {
        let current = self.get(product_id)?.quantity;
        let next = (i64::from(current) + i64::from(delta)).max(0);
        let next = u32::try_from(next).unwrap_or(u32::MAX);
        self.set_quantity(product_id, next);
        Some(next)
    }

    /// Set a line's quantity outright. Zero removes the line.
    ///
    /// Returns `false` if the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id);
        }
        match self
            .items
            .iter_mut()
            .find(|line| &line.product_id == product_id)
        {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove a line. Returns `false` if it was not present.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|line| &line.product_id != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Σ price × quantity.
    #[must_use]
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Σ quantity, as shown on the cart badge.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Compare the total against [`MINIMUM_ORDER`].
    #[must_use]
    pub fn checkout_gate(&self) -> CheckoutGate {
        let total = self.total();
        if total >= MINIMUM_ORDER {
            CheckoutGate::Ready
        } else {
            CheckoutGate::BelowMinimum {
                shortfall: MINIMUM_ORDER - total,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: &str, pence: i64) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            product_name: format!("Item {id}"),
            category: "Wash & Fold".to_owned(),
            subcategory: None,
            business_id: BusinessId::new("b1"),
            business_name: "Bubbles Laundry".to_owned(),
            price: Money::from_pence(pence),
            quantity: 1,
        }
    }

    #[test]
    fn test_adding_same_product_twice_increments() {
        let mut cart = Cart::new();
        cart.add(line("p1", 500));
        let quantity = cart.add(line("p1", 500));

        assert_eq!(quantity, 2);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_add_keeps_locked_price() {
        let mut cart = Cart::new();
        cart.add(line("p1", 500));
        cart.add(line("p1", 900));

        let held = cart.get(&ProductId::new("p1")).unwrap();
        assert_eq!(held.price, Money::from_pence(500));
        assert_eq!(cart.total(), Money::from_pence(1000));
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new();
        cart.add(line("b", 100));
        cart.add(line("a", 100));
        cart.add(line("b", 100));
        let ids: Vec<_> = cart.items().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn test_adjust_to_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add(line("p1", 500));
        cart.add(line("p2", 1200));

        assert_eq!(cart.adjust(&ProductId::new("p1"), -1), Some(0));
        assert!(cart.get(&ProductId::new("p1")).is_none());
        assert_eq!(cart.total(), Money::from_pence(1200));
    }

    #[test]
    fn test_adjust_clamps_at_zero() {
        let mut cart = Cart::new();
        cart.add(line("p1", 500));
        assert_eq!(cart.adjust(&ProductId::new("p1"), -5), Some(0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_adjust_unknown_product() {
        let mut cart = Cart::new();
        assert_eq!(cart.adjust(&ProductId::new("nope"), 1), None);
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::new();
        cart.add(line("p1", 500));
        assert!(cart.set_quantity(&ProductId::new("p1"), 4));
        assert_eq!(cart.item_count(), 4);
        assert!(cart.set_quantity(&ProductId::new("p1"), 0));
        assert!(cart.is_empty());
        assert!(!cart.set_quantity(&ProductId::new("p1"), 2));
    }

    #[test]
    fn test_below_minimum_reports_exact_shortfall() {
        let mut cart = Cart::new();
        let mut shirt = line("shirt", 350);
        shirt.quantity = 3;
        cart.add(shirt);

        assert_eq!(
            cart.checkout_gate(),
            CheckoutGate::BelowMinimum {
                shortfall: Money::from_pence(1950)
            }
        );
    }

    #[test]
    fn test_exact_minimum_is_ready() {
        let mut cart = Cart::new();
        let mut duvet = line("duvet", 1500);
        duvet.quantity = 2;
        cart.add(duvet);
        assert!(cart.checkout_gate().is_ready());
    }

    #[test]
    fn test_empty_cart_is_short_by_whole_minimum() {
        assert_eq!(
            Cart::new().checkout_gate(),
            CheckoutGate::BelowMinimum {
                shortfall: MINIMUM_ORDER
            }
        );
    }

    #[test]
    fn test_oversized_cart_total_does_not_overflow() {
        let mut cart = Cart::new();
        let mut huge = line("huge", 0);
        huge.price = Money::new(rust_decimal::Decimal::MAX / rust_decimal::Decimal::TWO);
        huge.quantity = 3;
        cart.add(huge);
        cart.add(line("shirt", 495));

        assert_eq!(cart.total(), Money::new(rust_decimal::Decimal::MAX));
        assert!(cart.checkout_gate().is_ready());
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let mut cart = Cart::new();
        cart.add(line("p1", 500));
        let value = serde_json::to_value(&cart).unwrap();
        assert!(value.is_array());
        let back: Cart = serde_json::from_value(value).unwrap();
        assert_eq!(back, cart);
    }
}
