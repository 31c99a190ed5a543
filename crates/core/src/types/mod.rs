//! Core types for FreshFold.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod postcode;
pub mod slot;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{Money, MoneyError};
pub use postcode::{Postcode, PostcodeError};
pub use slot::{DeliveryInstruction, PickupInstruction, TimeSlot, UnknownOption, slot_label};
pub use status::*;
