//! Session-held models for the storefront.

pub mod session;

pub use session::{Flash, FlashLevel, keys as session_keys};
