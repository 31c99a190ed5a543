//! Email address type used by login, registration and business owner forms.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// Nothing was entered.
    #[error("Please enter an email address")]
    Empty,
    /// Longer than the SMTP path limit.
    #[error("Email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// Not shaped like `local@domain`.
    #[error("Please enter a valid email address")]
    Malformed,
}

/// A trimmed, lower-cased email address.
///
/// Only the shape is checked (`local@domain` with a dot in the domain); the
/// backend is the authority on whether the address is acceptable.
///
/// ```
/// use freshfold_core::Email;
///
/// let email = Email::parse("  Jane@Example.COM ").unwrap();
/// assert_eq!(email.as_str(), "jane@example.com");
/// assert!(Email::parse("jane@localhost").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse and normalize an email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, or not of the form
    /// `local@domain.tld`.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let (local, domain) = trimmed.split_once('@').ok_or(EmailError::Malformed)?;
        let domain_ok = !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.');
        if local.is_empty() || !domain_ok || trimmed.chars().any(char::is_whitespace) {
            return Err(EmailError::Malformed);
        }

        Ok(Self(trimmed.to_lowercase()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let email = Email::parse(" Owner@Laundry.co.uk ").unwrap();
        assert_eq!(email.as_str(), "owner@laundry.co.uk");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_rejects_missing_parts() {
        assert_eq!(Email::parse("no-at-sign"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("@example.com"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("user@"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("user@nodot"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("a b@example.com"), Err(EmailError::Malformed));
    }

    #[test]
    fn test_parse_rejects_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { max: 254 })
        ));
    }
}
