//! Key-Value store contract and a typed wrapper with automatic serialization.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;

use crate::CacheError;

/// Default bound on a single store operation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// A durable byte-oriented key-value store.
///
/// Missing keys are `Ok(None)`, not errors. Implementations must be usable
/// from any task.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the bytes stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;

    /// Remove `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// List every key currently stored.
    async fn keys(&self) -> Result<Vec<String>, CacheError>;

    /// Check if a key exists.
    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key).await?.is_some())
    }
}

/// In-process store, used for tests and sessions that need no durability.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}

/// Type-safe cache over any [`KeyValueStore`].
///
/// Values are stored as JSON. Every operation is bounded by the configured
/// timeout so a stalled store never blocks the caller indefinitely.
///
/// # Example
///
/// ```rust,ignore
/// let cache = Cache::new(Arc::new(MemoryStore::new()));
/// cache.set("cart", &items).await?;
/// let items: Option<Vec<LineItem>> = cache.get("cart").await?;
/// ```
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn KeyValueStore>,
    timeout: Duration,
}

impl Cache {
    /// Wrap a store with the default timeout.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-operation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The per-operation timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist and
    /// [`CacheError::Corrupt`] if the stored bytes are not a valid `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let Some(bytes) = self.bounded(key, self.store.get(key)).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| CacheError::Corrupt {
                key: key.to_string(),
                source,
            })
    }

    /// Set a value in the cache.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.bounded(key, self.store.set(key, &bytes)).await
    }

    /// Delete a value from the cache.
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.bounded(key, self.store.delete(key)).await
    }

    /// Check if a key exists in the cache.
    pub async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.bounded(key, self.store.exists(key)).await
    }

    /// Get every key starting with `prefix`.
    pub async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        let keys = self.bounded(prefix, self.store.keys()).await?;
        Ok(keys.into_iter().filter(|k| k.starts_with(prefix)).collect())
    }

    async fn bounded<T>(
        &self,
        key: &str,
        op: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        match tokio::time::timeout(self.timeout, op).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(key, timeout_ms = self.timeout.as_millis() as u64, "store operation timed out");
                Err(CacheError::Timeout {
                    key: key.to_string(),
                    after: self.timeout,
                })
            }
        }
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```
/// let key = shop_cache::cache_key!("favorite", "shirt-01");
/// assert_eq!(key, "favorite:shirt-01");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}
