//! Newtype IDs for type-safe entity references.
//!
//! The backend hands out opaque string identifiers (UUIDs today). Use the
//! `define_id!` macro to wrap them so business, product and order ids cannot
//! be mixed up.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `new()`, `as_str()`, `short()` and `Display`
/// - `From<String>` / `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use freshfold_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new("u-1");
/// let order_id = OrderId::new("o-1");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// # let _ = (user_id, order_id);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// First eight characters, used as a human-facing reference.
            #[must_use]
            pub fn short(&self) -> &str {
                self.0.get(..8).unwrap_or(&self.0)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(UserId);
define_id!(BusinessId);
define_id!(ProductId);
define_id!(OrderId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_truncates_uuid() {
        let id = OrderId::new("3f2c1a9e-0000-4000-8000-000000000000");
        assert_eq!(id.short(), "3f2c1a9e");
    }

    #[test]
    fn test_short_keeps_short_ids() {
        let id = ProductId::new("p1");
        assert_eq!(id.short(), "p1");
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = BusinessId::new("b-42");
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("\"b-42\""));
    }
}
