//! Money type for representing monetary values.
//!
//! Amounts are integers in the currency's minor unit. Binary floating point
//! never touches a price, so repeated add/update cycles cannot drift.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CommerceError;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    VND,
    USD,
    EUR,
    GBP,
    JPY,
}

impl Currency {
    /// Get the currency code (e.g., "VND").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::VND => "VND",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
        }
    }

    /// Get the currency symbol (e.g., "₫").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::VND => "\u{20ab}",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::VND | Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Whether the symbol is written after the amount.
    fn symbol_trails(&self) -> bool {
        matches!(self, Currency::VND)
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "VND" => Some(Currency::VND),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Amount in smallest currency unit.
    pub amount_minor: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_minor < 0
    }

    /// Add another Money value.
    pub fn checked_add(&self, other: &Money) -> Result<Money, CommerceError> {
        self.ensure_same_currency(other)?;
        self.amount_minor
            .checked_add(other.amount_minor)
            .map(|amount| Money::new(amount, self.currency))
            .ok_or(CommerceError::Overflow)
    }

    /// Subtract another Money value.
    pub fn checked_sub(&self, other: &Money) -> Result<Money, CommerceError> {
        self.ensure_same_currency(other)?;
        self.amount_minor
            .checked_sub(other.amount_minor)
            .map(|amount| Money::new(amount, self.currency))
            .ok_or(CommerceError::Overflow)
    }

    /// Multiply by a quantity.
    pub fn checked_mul(&self, factor: i64) -> Result<Money, CommerceError> {
        self.amount_minor
            .checked_mul(factor)
            .map(|amount| Money::new(amount, self.currency))
            .ok_or(CommerceError::Overflow)
    }

    /// The smaller of two amounts in the same currency.
    pub fn min(&self, other: &Money) -> Result<Money, CommerceError> {
        self.ensure_same_currency(other)?;
        Ok(if other.amount_minor < self.amount_minor {
            *other
        } else {
            *self
        })
    }

    /// Sum an iterator of Money values.
    pub fn try_sum<'a>(
        iter: impl IntoIterator<Item = &'a Money>,
        currency: Currency,
    ) -> Result<Money, CommerceError> {
        iter.into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.checked_add(m))
    }

    /// Format as a display string (e.g., "$49.99" or "150000 ₫").
    pub fn display(&self) -> String {
        let amount = self.display_amount();
        if self.currency.symbol_trails() {
            format!("{} {}", amount, self.currency.symbol())
        } else {
            format!("{}{}", self.currency.symbol(), amount)
        }
    }

    /// Format as a display string without symbol (e.g., "49.99").
    pub fn display_amount(&self) -> String {
        let places = self.currency.decimal_places();
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.amount_minor.unsigned_abs();
        if places == 0 {
            return format!("{}{}", sign, abs);
        }
        let divisor = 10_u64.pow(places);
        format!(
            "{}{}.{:0width$}",
            sign,
            abs / divisor,
            abs % divisor,
            width = places as usize
        )
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), CommerceError> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: other.currency.code().to_string(),
            })
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(4999, Currency::USD).display(), "$49.99");
        assert_eq!(Money::new(5, Currency::EUR).display(), "\u{20ac}0.05");
        assert_eq!(Money::new(150000, Currency::VND).display(), "150000 \u{20ab}");
        assert_eq!(Money::new(-250, Currency::USD).display_amount(), "-2.50");
    }

    #[test]
    fn test_money_addition() {
        let a = Money::new(1000, Currency::VND);
        let b = Money::new(500, Currency::VND);
        assert_eq!(a.checked_add(&b).unwrap().amount_minor, 1500);
    }

    #[test]
    fn test_money_subtraction() {
        let a = Money::new(1000, Currency::USD);
        let b = Money::new(300, Currency::USD);
        assert_eq!(a.checked_sub(&b).unwrap().amount_minor, 700);
    }

    #[test]
    fn test_money_multiply_overflow() {
        let m = Money::new(i64::MAX / 2 + 1, Currency::VND);
        assert!(matches!(m.checked_mul(2), Err(CommerceError::Overflow)));
        assert_eq!(Money::new(1000, Currency::VND).checked_mul(3).unwrap().amount_minor, 3000);
    }

    #[test]
    fn test_money_currency_mismatch() {
        let usd = Money::new(1000, Currency::USD);
        let eur = Money::new(1000, Currency::EUR);
        assert!(matches!(
            usd.checked_add(&eur),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_money_min() {
        let a = Money::new(20000, Currency::VND);
        let b = Money::new(10000, Currency::VND);
        assert_eq!(a.min(&b).unwrap(), b);
        assert_eq!(b.min(&a).unwrap(), b);
    }

    #[test]
    fn test_try_sum_empty_is_zero() {
        let total = Money::try_sum(std::iter::empty(), Currency::VND).unwrap();
        assert_eq!(total, Money::zero(Currency::VND));
    }

    #[test]
    fn test_money_serializes_camel_case() {
        let json = serde_json::to_string(&Money::new(150000, Currency::VND)).unwrap();
        assert_eq!(json, r#"{"amountMinor":150000,"currency":"VND"}"#);
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("vnd"), Some(Currency::VND));
        assert_eq!(Currency::from_code("USD"), Some(Currency::USD));
        assert_eq!(Currency::from_code("INVALID"), None);
    }
}
