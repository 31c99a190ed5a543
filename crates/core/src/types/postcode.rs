//! Postcode entered at the availability gate.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Postcode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PostcodeError {
    #[error("Please enter a valid postcode")]
    TooShort,
}

/// A trimmed, upper-cased postcode.
///
/// Serviceability is decided by the backend; this only rejects input that
/// is obviously not a postcode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Postcode(String);

impl Postcode {
    /// Shortest accepted postcode.
    pub const MIN_LENGTH: usize = 3;

    /// Parse a postcode typed by a customer.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::TooShort`] for input shorter than
    /// [`Self::MIN_LENGTH`] characters after trimming.
    pub fn parse(s: &str) -> Result<Self, PostcodeError> {
        let trimmed = s.trim();
        if trimmed.chars().count() < Self::MIN_LENGTH {
            return Err(PostcodeError::TooShort);
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Postcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Postcode {
    type Err = PostcodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uppercases() {
        assert_eq!(Postcode::parse(" sw1a 1aa ").unwrap().as_str(), "SW1A 1AA");
    }

    #[test]
    fn test_parse_rejects_short_input() {
        assert_eq!(Postcode::parse(" e1 "), Err(PostcodeError::TooShort));
        assert_eq!(Postcode::parse(""), Err(PostcodeError::TooShort));
    }

    #[test]
    fn test_three_characters_is_enough() {
        assert!(Postcode::parse("E14").is_ok());
    }
}
