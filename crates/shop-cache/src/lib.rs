//! Durable key-value storage for the storefront engine.
//!
//! Provides a small async store contract with two backends (in-memory and
//! directory-backed) and a typed [`Cache`] that handles JSON serialization
//! and bounds every call with a timeout.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shop_cache::{Cache, FileStore};
//!
//! let store = FileStore::open(".shop").await?;
//! let cache = Cache::new(Arc::new(store));
//!
//! // Store a value
//! cache.set("cart", &items).await?;
//!
//! // Retrieve a value
//! let items: Option<Vec<LineItem>> = cache.get("cart").await?;
//!
//! // Delete a value
//! cache.delete("cart").await?;
//! ```

mod error;
mod file;
mod kv;

pub use error::CacheError;
pub use file::FileStore;
pub use kv::{Cache, KeyValueStore, MemoryStore, DEFAULT_TIMEOUT};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, KeyValueStore, MemoryStore};
}
