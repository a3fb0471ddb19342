//! Discount codes and their application to a subtotal.

use std::collections::BTreeMap;

use crate::cart::CheckoutTotals;
use crate::error::CommerceError;
use crate::money::{Currency, Money};

/// The placeholder code the storefront ships with.
pub const DEFAULT_CODE: &str = "NAT";

/// Amount off granted by [`DEFAULT_CODE`], in minor units.
pub const DEFAULT_CODE_AMOUNT: i64 = 20000;

/// Looks up how much a discount code is worth.
///
/// Lookup is exact and case-sensitive. A remote lookup service can slot in
/// behind this trait.
pub trait DiscountResolver: Send + Sync {
    /// Amount off for `code`, or `None` if the code is unknown.
    fn resolve(&self, code: &str) -> Option<Money>;
}

/// A fixed table of codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountTable {
    codes: BTreeMap<String, Money>,
}

impl DiscountTable {
    /// An empty table; every code is rejected.
    pub fn empty() -> Self {
        Self {
            codes: BTreeMap::new(),
        }
    }

    /// Add or replace a code.
    pub fn with_code(mut self, code: impl Into<String>, amount_off: Money) -> Self {
        self.codes.insert(code.into(), amount_off);
        self
    }

    /// Build a table from code → minor-unit amounts in one currency.
    pub fn from_minor_units<I, S>(currency: Currency, codes: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        codes
            .into_iter()
            .fold(Self::empty(), |table, (code, amount)| {
                table.with_code(code, Money::new(amount, currency))
            })
    }

    /// Number of known codes.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Check if the table has no codes.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for DiscountTable {
    fn default() -> Self {
        Self::empty().with_code(DEFAULT_CODE, Money::new(DEFAULT_CODE_AMOUNT, Currency::VND))
    }
}

impl DiscountResolver for DiscountTable {
    fn resolve(&self, code: &str) -> Option<Money> {
        self.codes.get(code).copied()
    }
}

/// Result of applying a code to a subtotal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscountOutcome {
    /// The code was recognised; totals include the (clamped) discount.
    Applied { code: String, totals: CheckoutTotals },
    /// The code is unknown; totals are undiscounted.
    Rejected { code: String, totals: CheckoutTotals },
}

impl DiscountOutcome {
    /// The totals to show, whichever way the code went.
    pub fn totals(&self) -> CheckoutTotals {
        match self {
            DiscountOutcome::Applied { totals, .. } | DiscountOutcome::Rejected { totals, .. } => {
                *totals
            }
        }
    }

    /// Check if the code was accepted.
    pub fn is_applied(&self) -> bool {
        matches!(self, DiscountOutcome::Applied { .. })
    }

    /// Surface a rejection as [`CommerceError::InvalidDiscountCode`].
    pub fn into_result(self) -> Result<CheckoutTotals, CommerceError> {
        match self {
            DiscountOutcome::Applied { totals, .. } => Ok(totals),
            DiscountOutcome::Rejected { code, .. } => Err(CommerceError::InvalidDiscountCode(code)),
        }
    }
}

/// Apply `code` to `subtotal`.
///
/// Unknown codes leave the subtotal untouched. The amount off is clamped to
/// the subtotal so the final total never goes negative.
pub fn apply_discount(
    subtotal: Money,
    code: &str,
    resolver: &dyn DiscountResolver,
) -> Result<DiscountOutcome, CommerceError> {
    let Some(amount_off) = resolver.resolve(code) else {
        tracing::debug!(code, "discount code rejected");
        return Ok(DiscountOutcome::Rejected {
            code: code.to_string(),
            totals: CheckoutTotals::undiscounted(subtotal),
        });
    };

    let applied = if amount_off.is_negative() || subtotal.is_negative() {
        Money::zero(subtotal.currency)
    } else {
        subtotal.min(&amount_off)?
    };
    let final_total = subtotal.checked_sub(&applied)?;

    Ok(DiscountOutcome::Applied {
        code: code.to_string(),
        totals: CheckoutTotals {
            subtotal,
            applied_discount: applied,
            final_total,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vnd(amount: i64) -> Money {
        Money::new(amount, Currency::VND)
    }

    #[test]
    fn test_nat_code() {
        let outcome = apply_discount(vnd(100000), "NAT", &DiscountTable::default()).unwrap();
        let totals = outcome.totals();
        assert!(outcome.is_applied());
        assert_eq!(totals.applied_discount, vnd(20000));
        assert_eq!(totals.final_total, vnd(80000));
    }

    #[test]
    fn test_discount_clamped_to_subtotal() {
        let outcome = apply_discount(vnd(10000), "NAT", &DiscountTable::default()).unwrap();
        let totals = outcome.into_result().unwrap();
        assert_eq!(totals.applied_discount, vnd(10000));
        assert_eq!(totals.final_total, vnd(0));
    }

    #[test]
    fn test_unknown_code() {
        let outcome = apply_discount(vnd(55000), "BOGUS", &DiscountTable::default()).unwrap();
        assert_eq!(outcome.totals().final_total, vnd(55000));
        assert!(outcome.totals().applied_discount.is_zero());
        assert!(matches!(
            outcome.into_result(),
            Err(CommerceError::InvalidDiscountCode(code)) if code == "BOGUS"
        ));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let outcome = apply_discount(vnd(100000), "nat", &DiscountTable::default()).unwrap();
        assert!(!outcome.is_applied());
    }

    #[test]
    fn test_currency_mismatch() {
        let subtotal = Money::new(10000, Currency::USD);
        let result = apply_discount(subtotal, "NAT", &DiscountTable::default());
        assert!(matches!(result, Err(CommerceError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_table_from_minor_units() {
        let table = DiscountTable::from_minor_units(Currency::USD, [("SAVE5", 500)]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.resolve("SAVE5"), Some(Money::new(500, Currency::USD)));
        assert_eq!(table.resolve("NAT"), None);
    }
}
