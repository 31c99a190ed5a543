//! Session-related types.
//!
//! The session is the per-browser store: it holds the cart, the postcode
//! gate and the signed-in account. None of it reaches the backend until
//! checkout.

use serde::{Deserialize, Serialize};

/// Severity of a one-shot notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Error,
    Info,
}

impl FlashLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

/// A notice shown once on the next full page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// The cart line list.
    pub const CART: &str = "cart";

    /// Per-session UUID that routes cart events to this session's views.
    pub const CART_KEY: &str = "cart_key";

    /// Postcode that passed the availability check.
    pub const POSTCODE: &str = "postcode";

    /// Businesses serving that postcode.
    pub const BUSINESSES: &str = "businesses";

    /// The signed-in account.
    pub const CURRENT_USER: &str = "current_user";

    /// Bearer token for the backend.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// Pending one-shot notice.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_serde() {
        let flash = Flash::success("Added to cart");
        let json = serde_json::to_string(&flash).unwrap();
        assert_eq!(json, r#"{"level":"success","message":"Added to cart"}"#);
        let back: Flash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, flash);
    }
}
