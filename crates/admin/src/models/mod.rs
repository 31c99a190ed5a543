//! Session-held types for admin.

pub mod session;

pub use session::{CurrentAdmin, Flash, FlashLevel, keys as session_keys};
