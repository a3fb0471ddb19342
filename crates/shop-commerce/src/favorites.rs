//! Favorited catalog items.
//!
//! Each id is stored under its own `favorite:<id>` key as a JSON boolean, so
//! toggling one item never rewrites the others.

use std::collections::BTreeSet;

use futures::future::join_all;
use shop_cache::{cache_key, Cache};

use crate::catalog::CatalogItem;
use crate::error::CommerceError;
use crate::ids::CatalogId;

/// Prefix shared by every favorite record.
pub const FAVORITE_PREFIX: &str = "favorite";

/// Store key for one favorite record.
pub fn favorite_key(catalog_id: &CatalogId) -> String {
    cache_key!(FAVORITE_PREFIX, catalog_id)
}

/// The set of favorited ids.
#[derive(Debug)]
pub struct FavoritesStore {
    ids: BTreeSet<CatalogId>,
    cache: Cache,
    pending: BTreeSet<CatalogId>,
}

impl FavoritesStore {
    /// Hydrate from every `favorite:*` record.
    ///
    /// Unreadable records are skipped; a store failure yields an empty set.
    pub async fn load(cache: Cache) -> Self {
        let prefix = format!("{}:", FAVORITE_PREFIX);
        let keys = match cache.keys_with_prefix(&prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "favorites unavailable; starting empty");
                Vec::new()
            }
        };

        let records = join_all(keys.iter().map(|key| cache.get::<bool>(key))).await;
        let mut ids = BTreeSet::new();
        for (key, record) in keys.iter().zip(records) {
            match record {
                Ok(Some(true)) => {
                    ids.insert(CatalogId::new(&key[prefix.len()..]));
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "skipping favorite record");
                }
            }
        }

        tracing::debug!(count = ids.len(), "favorites loaded");
        Self {
            ids,
            cache,
            pending: BTreeSet::new(),
        }
    }

    /// Flip the favorite state of `catalog_id`. Returns the new state.
    pub async fn toggle(&mut self, catalog_id: &CatalogId) -> bool {
        let favorite = if self.ids.remove(catalog_id) {
            false
        } else {
            self.ids.insert(catalog_id.clone());
            true
        };
        tracing::debug!(catalog_id = %catalog_id, favorite, "favorite toggled");
        self.persist(catalog_id).await;
        favorite
    }

    /// Unfavorite `catalog_id`. Returns whether it was a favorite.
    pub async fn remove(&mut self, catalog_id: &CatalogId) -> bool {
        if !self.ids.remove(catalog_id) {
            return false;
        }
        tracing::debug!(catalog_id = %catalog_id, "favorite removed");
        self.persist(catalog_id).await;
        true
    }

    /// Number of favorited items.
    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn is_favorite(&self, catalog_id: &CatalogId) -> bool {
        self.ids.contains(catalog_id)
    }

    /// Favorited ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &CatalogId> {
        self.ids.iter()
    }

    /// The favorited items of `catalog`, in catalog order.
    ///
    /// Favorites missing from the catalog are left out.
    pub fn favorite_items<'a>(&self, catalog: &'a [CatalogItem]) -> Vec<&'a CatalogItem> {
        catalog
            .iter()
            .filter(|item| self.ids.contains(&item.id))
            .collect()
    }

    /// Check if any record failed to persist.
    pub fn has_pending_writes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Retry every failed record write.
    ///
    /// Stops at the first failure; records written before it are no longer
    /// pending.
    pub async fn flush(&mut self) -> Result<(), CommerceError> {
        while let Some(catalog_id) = self.pending.first().cloned() {
            let key = favorite_key(&catalog_id);
            self.cache
                .set(&key, &self.ids.contains(&catalog_id))
                .await
                .map_err(|e| CommerceError::write_failed(&key, &e))?;
            self.pending.remove(&catalog_id);
        }
        Ok(())
    }

    async fn persist(&mut self, catalog_id: &CatalogId) {
        let key = favorite_key(catalog_id);
        match self.cache.set(&key, &self.ids.contains(catalog_id)).await {
            Ok(()) => {
                self.pending.remove(catalog_id);
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "favorite write failed; will retry");
                self.pending.insert(catalog_id.clone());
            }
        }
    }
}
