//! Transient notices for HTMX fragment responses.
//!
//! Fragment responses cannot carry a session flash, so they raise client
//! events through the `HX-Trigger` header instead. `static/js/app.js`
//! turns a `toast` event into a notice.

use axum::http::HeaderValue;
use axum::response::{IntoResponseParts, ResponseParts};
use serde_json::{Map, Value, json};

use crate::models::FlashLevel;

/// Event that tells listeners the cart changed.
pub const CART_UPDATED: &str = "cart-updated";

/// Builder for an `HX-Trigger` header.
///
/// ```rust,ignore
/// (HxTrigger::new().cart_updated().toast(FlashLevel::Success, "Added to cart"), fragment)
/// ```
#[derive(Debug, Clone, Default)]
pub struct HxTrigger {
    events: Map<String, Value>,
}

impl HxTrigger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal that the cart changed.
    #[must_use]
    pub fn cart_updated(mut self) -> Self {
        self.events.insert(CART_UPDATED.to_owned(), Value::Null);
        self
    }

    /// Show a notice.
    #[must_use]
    pub fn toast(mut self, level: FlashLevel, message: impl Into<String>) -> Self {
        self.events.insert(
            "toast".to_owned(),
            json!({ "level": level.as_str(), "message": message.into() }),
        );
        self
    }

    /// Header value. Non-ASCII text (like `£`) is escaped so the value is
    /// valid in an HTTP header.
    #[must_use]
    pub fn header_value(&self) -> String {
        let raw = Value::Object(self.events.clone()).to_string();
        let mut escaped = String::with_capacity(raw.len());
        for ch in raw.chars() {
            if ch.is_ascii() {
                escaped.push(ch);
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    escaped.push_str(&format!("\\u{unit:04x}"));
                }
            }
        }
        escaped
    }
}

impl IntoResponseParts for HxTrigger {
    type Error = std::convert::Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if self.events.is_empty() {
            return Ok(res);
        }
        match HeaderValue::from_str(&self.header_value()) {
            Ok(value) => {
                res.headers_mut().insert("HX-Trigger", value);
            }
            Err(e) => tracing::warn!("Dropping unencodable HX-Trigger header: {e}"),
        }
        Ok(res)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_updated_with_toast() {
        let trigger = HxTrigger::new()
            .cart_updated()
            .toast(FlashLevel::Success, "Added to cart");
        let value: Value = serde_json::from_str(&trigger.header_value()).unwrap();
        assert!(value.get("cart-updated").is_some());
        assert_eq!(value["toast"]["level"], "success");
        assert_eq!(value["toast"]["message"], "Added to cart");
    }

    #[test]
    fn test_pound_sign_is_escaped() {
        let trigger = HxTrigger::new().toast(FlashLevel::Error, "Add £5.00 more");
        let header = trigger.header_value();
        assert!(header.is_ascii());
        assert!(header.contains("\\u00a3"));
        let value: Value = serde_json::from_str(&header).unwrap();
        assert_eq!(value["toast"]["message"], "Add £5.00 more");
    }
}
