//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("price must be a decimal number")]
    Invalid,
    /// The input is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The input is above [`Price::MAX_AMOUNT`].
    #[error("price cannot exceed {}", Price::MAX_AMOUNT)]
    TooLarge,
}

/// A non-negative price with currency information.
///
/// ```
/// use greengrocer_core::Price;
///
/// let price = Price::parse("12.5").unwrap();
/// assert_eq!(price.to_string(), "₹12.50");
/// assert_eq!(price.line_total(3).to_string(), "₹37.50");
/// assert!(Price::parse("-1").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rupees, not paise).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Largest accepted amount, in standard units.
    pub const MAX_AMOUNT: i64 = 10_000_000;

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the default currency.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(Decimal::ZERO, CurrencyCode::INR)
    }

    /// Parse a price in the default currency from form or database text.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Invalid` if the text is not a decimal,
    /// `PriceError::Negative` if it is below zero and `PriceError::TooLarge`
    /// above [`Price::MAX_AMOUNT`].
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid)?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }

        if amount > Decimal::from(Self::MAX_AMOUNT) {
            return Err(PriceError::TooLarge);
        }

        Ok(Self::new(amount.normalize(), CurrencyCode::default()))
    }

    /// Price of `quantity` units. Saturates instead of overflowing.
    #[must_use]
    pub fn line_total(&self, quantity: i64) -> Self {
        Self::new(
            self.amount.saturating_mul(Decimal::from(quantity)),
            self.currency_code,
        )
    }

    /// Add another amount in the same currency. Saturates instead of
    /// overflowing.
    #[must_use]
    pub fn plus(&self, other: &Self) -> Self {
        Self::new(self.amount.saturating_add(other.amount), self.currency_code)
    }

    /// Canonical decimal text used for storage.
    #[must_use]
    pub fn to_storage(&self) -> String {
        self.amount.normalize().to_string()
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Price::parse("10").unwrap().amount, Decimal::from(10));
        assert_eq!(Price::parse(" 0.50 ").unwrap().to_storage(), "0.5");
        assert_eq!(Price::parse("0").unwrap(), Price::zero());
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Price::parse("abc"), Err(PriceError::Invalid));
        assert_eq!(Price::parse(""), Err(PriceError::Invalid));
        assert_eq!(Price::parse("-0.01"), Err(PriceError::Negative));
        assert_eq!(Price::parse("10000000.01"), Err(PriceError::TooLarge));
        assert_eq!(
            Price::parse("100000000000000000000"),
            Err(PriceError::TooLarge)
        );
        assert!(Price::parse("10000000").is_ok());
    }

    #[test]
    fn test_line_total_and_plus() {
        let tomato = Price::parse("40").unwrap();
        let onion = Price::parse("25.5").unwrap();
        let total = tomato.line_total(3).plus(&onion.line_total(2));
        assert_eq!(total.amount, Decimal::from(171));
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Price::new(Decimal::MAX, CurrencyCode::INR);
        assert_eq!(huge.line_total(i64::MAX).amount, Decimal::MAX);
        assert_eq!(huge.plus(&huge).amount, Decimal::MAX);

        let top = Price::parse("10000000").unwrap();
        assert_eq!(
            top.line_total(10_000).amount,
            Decimal::from(100_000_000_000_i64)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::parse("7").unwrap().to_string(), "₹7.00");
        assert_eq!(
            Price::new(Decimal::new(1999, 2), CurrencyCode::USD).to_string(),
            "$19.99"
        );
    }

    #[test]
    fn test_default_currency() {
        assert_eq!(CurrencyCode::default().code(), "INR");
    }
}
