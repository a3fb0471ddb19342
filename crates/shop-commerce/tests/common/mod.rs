//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use shop_cache::{Cache, CacheError, KeyValueStore, MemoryStore};
use shop_commerce::prelude::*;

/// A memory store whose writes can be switched off.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::StoreError(format!("disk full writing {}", key)));
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.inner.delete(key).await
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.inner.keys().await
    }
}

pub fn memory_cache() -> Cache {
    Cache::new(Arc::new(MemoryStore::new()))
}

pub fn shirt() -> CatalogItem {
    CatalogItem::new("shirt", "Linen Shirt", Money::new(150000, Currency::VND))
        .with_variants(["S", "M", "L"])
}

pub fn tote() -> CatalogItem {
    CatalogItem::new("tote", "Canvas Tote", Money::new(90000, Currency::VND))
}

pub fn cap() -> CatalogItem {
    CatalogItem::new("cap", "Bucket Cap", Money::new(10000, Currency::VND))
}
