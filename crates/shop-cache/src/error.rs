//! Cache error types.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when using the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to open the store.
    #[error("Failed to open store: {0}")]
    OpenError(String),

    /// Failed to serialize a value before writing it.
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Bytes stored under a key could not be decoded.
    #[error("Corrupt value under key {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to perform store operation.
    #[error("Store operation failed: {0}")]
    StoreError(String),

    /// The store did not answer within the configured bound.
    #[error("Store operation on {key} timed out after {after:?}")]
    Timeout { key: String, after: Duration },
}

impl CacheError {
    /// Whether the error came from unreadable stored bytes rather than the store itself.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, CacheError::Corrupt { .. })
    }
}
