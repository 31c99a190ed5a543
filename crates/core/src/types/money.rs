//! Money amounts in pounds sterling using decimal arithmetic.
//!
//! The backend carries prices and totals as JSON numbers, so the serde
//! representation is a float while all arithmetic stays in [`Decimal`].

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul, Sub};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a price entered in a form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Please enter a price")]
    Empty,
    #[error("Please enter a valid price")]
    Invalid,
    #[error("Price cannot be negative")]
    Negative,
}

/// An amount of money in GBP.
///
/// ```
/// use freshfold_core::Money;
/// use rust_decimal::Decimal;
///
/// let price = Money::new(Decimal::new(450, 2));
/// assert_eq!(price.to_string(), "£4.50");
/// assert_eq!((price * 3).to_string(), "£13.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Money {
    /// Zero pounds.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Build an amount from whole pence.
    #[must_use]
    pub fn from_pence(pence: i64) -> Self {
        Self(Decimal::new(pence, 2))
    }

    /// Parse a price typed into a form, e.g. `"12.5"` or `"£12.50"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, not a number, or negative.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        let trimmed = s.trim().trim_start_matches('£').trim();
        if trimmed.is_empty() {
            return Err(MoneyError::Empty);
        }
        let amount: Decimal = trimmed.parse().map_err(|_| MoneyError::Invalid)?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        Ok(Self(amount.round_dp(2)))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Amount formatted without the currency symbol, for form inputs.
    #[must_use]
    pub fn plain(&self) -> String {
        format!("{:.2}", self.0.round_dp(2))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "£{:.2}", self.0.round_dp(2))
    }
}

// Arithmetic saturates at the decimal range instead of panicking.
impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(rhs)))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pence() {
        assert_eq!(Money::from_pence(3000).to_string(), "£30.00");
        assert_eq!(Money::from_pence(199).amount(), Decimal::new(199, 2));
    }

    #[test]
    fn test_parse_accepts_symbol_and_rounds() {
        assert_eq!(Money::parse(" £12.5 ").unwrap(), Money::from_pence(1250));
        assert_eq!(Money::parse("3.456").unwrap(), Money::from_pence(346));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Money::parse(""), Err(MoneyError::Empty));
        assert_eq!(Money::parse("twelve"), Err(MoneyError::Invalid));
        assert_eq!(Money::parse("-1"), Err(MoneyError::Negative));
    }

    #[test]
    fn test_sum_and_multiply() {
        let lines = [Money::from_pence(450) * 2, Money::from_pence(1000) * 1];
        let total: Money = lines.into_iter().sum();
        assert_eq!(total, Money::from_pence(1900));
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Money::new(Decimal::MAX / Decimal::TWO);
        assert_eq!(huge * 3, Money::new(Decimal::MAX));
        assert_eq!(huge + huge + huge, Money::new(Decimal::MAX));
        assert_eq!(Money::new(Decimal::MIN) - huge, Money::new(Decimal::MIN));
    }

    #[test]
    fn test_serde_uses_json_numbers() {
        let money: Money = serde_json::from_str("12.5").unwrap();
        assert_eq!(money, Money::from_pence(1250));
        let whole: Money = serde_json::from_str("30").unwrap();
        assert_eq!(whole, Money::from_pence(3000));
        assert_eq!(serde_json::to_string(&Money::from_pence(1250)).unwrap(), "12.5");
    }

    #[test]
    fn test_plain_format() {
        assert_eq!(Money::from_pence(700).plain(), "7.00");
    }
}
