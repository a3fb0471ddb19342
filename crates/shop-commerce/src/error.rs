//! Commerce error types.

use shop_cache::CacheError;
use thiserror::Error;

use crate::ids::BatchId;

/// Errors that can occur in cart, favorites, pricing and checkout operations.
///
/// None of these are fatal to a session: read failures fail open to empty
/// state, write failures are retried, and the rest are user-facing
/// rejections the caller shows and recovers from.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// The catalog item has sizes but none was chosen.
    #[error("A variant must be chosen for {0}")]
    VariantRequired(String),

    /// The chosen variant is not offered for the item.
    #[error("Variant {variant} is not available for {catalog_id}")]
    UnknownVariant { catalog_id: String, variant: String },

    /// Invalid discount code.
    #[error("Invalid discount code: {0}")]
    InvalidDiscountCode(String),

    /// The catalog could not be fetched or parsed.
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// A persisted snapshot could not be decoded.
    #[error("Persisted data under {key} is corrupt: {reason}")]
    PersistenceReadCorrupt { key: String, reason: String },

    /// A snapshot could not be written.
    #[error("Failed to persist {key}: {reason}")]
    PersistenceWriteFailed { key: String, reason: String },

    /// A checkout batch is already outstanding.
    #[error("Checkout batch {0} is already in flight")]
    BatchAlreadyInFlight(BatchId),

    /// No checkout batch is outstanding.
    #[error("No checkout batch in flight")]
    NoBatchInFlight,

    /// The confirmation refers to a different batch than the one in flight.
    #[error("Checkout batch mismatch: expected {expected}, got {got}")]
    BatchMismatch { expected: BatchId, got: BatchId },

    /// Checkout was requested with nothing to buy.
    #[error("No items selected for checkout")]
    NothingSelected,

    /// Confirmation was requested before a payment method was chosen.
    #[error("A payment method must be chosen before confirming")]
    PaymentMethodRequired,

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}

impl CommerceError {
    /// A store failure while writing `key`.
    pub fn write_failed(key: &str, error: &CacheError) -> Self {
        CommerceError::PersistenceWriteFailed {
            key: key.to_string(),
            reason: error.to_string(),
        }
    }

    /// A snapshot under `key` that could not be decoded or was invalid.
    pub fn read_corrupt(key: &str, reason: impl ToString) -> Self {
        CommerceError::PersistenceReadCorrupt {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Check if this error is a user-facing rejection rather than a storage problem.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            CommerceError::PersistenceReadCorrupt { .. }
                | CommerceError::PersistenceWriteFailed { .. }
                | CommerceError::CatalogUnavailable(_)
                | CommerceError::SerializationError(_)
        )
    }
}
