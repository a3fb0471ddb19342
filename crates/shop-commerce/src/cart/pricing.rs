//! Cart pricing calculations.

use serde::{Deserialize, Serialize};

use crate::cart::{LineIdentity, LineItem};
use crate::error::CommerceError;
use crate::money::{Currency, Money};

/// Which entries a subtotal covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CartView {
    /// Every entry in the cart.
    All,
    /// Only entries marked for checkout.
    Selected,
}

impl CartView {
    /// Check if `item` belongs to this view.
    pub fn includes(&self, item: &LineItem) -> bool {
        match self {
            CartView::All => true,
            CartView::Selected => item.selected,
        }
    }
}

/// Sum of line totals for any sequence of line items.
///
/// An empty sequence totals zero in `currency`; items priced in another
/// currency are rejected.
pub fn compute_subtotal<'a>(
    items: impl IntoIterator<Item = &'a LineItem>,
    currency: Currency,
) -> Result<Money, CommerceError> {
    items.into_iter().try_fold(Money::zero(currency), |acc, item| {
        acc.checked_add(&item.line_total()?)
    })
}

/// Pricing breakdown for a single line item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItemPricing {
    /// Which entry this row prices.
    pub identity: LineIdentity,
    /// Unit price.
    pub unit_price: Money,
    /// Quantity.
    pub quantity: i64,
    /// Unit price times quantity.
    pub total: Money,
}

/// Price every line in order.
pub fn price_lines<'a>(
    items: impl IntoIterator<Item = &'a LineItem>,
) -> Result<Vec<LineItemPricing>, CommerceError> {
    items
        .into_iter()
        .map(|item| {
            Ok(LineItemPricing {
                identity: item.identity(),
                unit_price: item.unit_price,
                quantity: item.quantity,
                total: item.line_total()?,
            })
        })
        .collect()
}

/// Totals for one checkout pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutTotals {
    /// Subtotal before discounts.
    pub subtotal: Money,
    /// Discount actually taken off, never more than the subtotal.
    pub applied_discount: Money,
    /// Amount to pay; never negative.
    pub final_total: Money,
}

impl CheckoutTotals {
    /// Totals with no discount applied.
    pub fn undiscounted(subtotal: Money) -> Self {
        Self {
            subtotal,
            applied_discount: Money::zero(subtotal.currency),
            final_total: subtotal,
        }
    }

    /// Check if any discount is applied.
    pub fn has_discount(&self) -> bool {
        self.applied_discount.amount_minor > 0
    }
}
