//! FreshFold Core - Shared types library.
//!
//! This crate provides the pieces shared by every FreshFold component:
//! - `storefront` - Customer-facing laundry marketplace
//! - `admin` - Administration console for businesses, products and orders
//! - `cli` - Command-line tools for seeding and operations
//!
//! # Architecture
//!
//! The default build contains only types and pure state machines - no I/O.
//! The `client` feature adds a typed HTTP client for the FreshFold backend
//! API, which owns all pricing, availability, persistence and auth.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, money, emails, postcodes, slots and statuses
//! - [`models`] - Records exchanged with the backend API
//! - [`cart`] - Session-held cart and the minimum-order gate
//! - [`checkout`] - Checkout draft with scheduling defaults and validation
//! - `client` - Backend REST client (feature `client`)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
#[cfg(feature = "client")]
pub mod client;
pub mod models;
pub mod types;

pub use cart::{Cart, CartItem, CheckoutGate, MINIMUM_ORDER};
pub use checkout::{CheckoutDraft, CheckoutError};
pub use types::*;
