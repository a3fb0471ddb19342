//! Catalog sources.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::catalog::CatalogItem;
use crate::error::CommerceError;

/// Where catalog items come from (a remote document store in production).
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch every item.
    ///
    /// Fails with [`CommerceError::CatalogUnavailable`] on network or parse errors.
    async fn fetch_all(&self) -> Result<Vec<CatalogItem>, CommerceError>;
}

/// Fetch the catalog, falling back to an empty list.
///
/// The caller shows an empty (retryable) listing instead of failing.
pub async fn load_catalog(source: &dyn CatalogSource) -> Vec<CatalogItem> {
    match source.fetch_all().await {
        Ok(items) => {
            tracing::debug!(count = items.len(), "catalog loaded");
            items
        }
        Err(e) => {
            tracing::warn!(error = %e, "catalog unavailable; showing empty list");
            Vec::new()
        }
    }
}

/// A fixed, in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    items: Vec<CatalogItem>,
}

impl StaticCatalog {
    /// Create a catalog serving `items`.
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch_all(&self) -> Result<Vec<CatalogItem>, CommerceError> {
        Ok(self.items.clone())
    }
}

/// A catalog read from a JSON array file on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    /// Serve the catalog stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for JsonFileCatalog {
    async fn fetch_all(&self) -> Result<Vec<CatalogItem>, CommerceError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            CommerceError::CatalogUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            CommerceError::CatalogUnavailable(format!("{}: {}", self.path.display(), e))
        })
    }
}
