//! Newtype IDs for type-safe identifiers.
//!
//! Keeps catalog ids and checkout batch ids from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Opaque id of a catalog item, assigned by the catalog source.
    CatalogId
);
define_id!(
    /// Id of one checkout batch.
    BatchId
);

impl BatchId {
    /// Generate a new unique batch ID.
    pub fn generate() -> Self {
        Self(format!("batch_{}", generate_id()))
    }
}

/// Generate a unique ID from the wall clock and a process-wide counter.
fn generate_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let counter = COUNTER.fetch_add(1, Ordering::SeqCst);

    format!("{:x}{:04x}", timestamp, counter & 0xffff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = CatalogId::new("shirt-123");
        assert_eq!(id.as_str(), "shirt-123");
    }

    #[test]
    fn test_batch_id_generation() {
        let id1 = BatchId::generate();
        let id2 = BatchId::generate();
        assert_ne!(id1, id2);
        assert!(id1.as_str().starts_with("batch_"));
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = CatalogId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""abc""#);

        let back: CatalogId = serde_json::from_str(r#""abc""#).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_display() {
        let id = CatalogId::new("prod-789");
        assert_eq!(format!("{}", id), "prod-789");
    }
}
