//! Shopping cart module.
//!
//! Line items and their identity rules, the persistent cart store, and the
//! pricing and discount engine that turns cart contents into totals.

mod discount;
mod line_item;
mod pricing;
mod store;

pub use discount::{
    apply_discount, DiscountOutcome, DiscountResolver, DiscountTable, DEFAULT_CODE,
    DEFAULT_CODE_AMOUNT,
};
pub use line_item::{validate_quantity, LineIdentity, LineItem, MAX_QUANTITY_PER_ITEM};
pub use pricing::{compute_subtotal, price_lines, CartView, CheckoutTotals, LineItemPricing};
pub use store::{CartStore, LoadedSnapshot, QuantityChange, SnapshotReader, CART_KEY};
