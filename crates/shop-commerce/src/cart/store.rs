//! The persistent cart.

use std::collections::HashSet;

use shop_cache::Cache;

use crate::cart::{compute_subtotal, validate_quantity, CartView, LineIdentity, LineItem};
use crate::catalog::CatalogItem;
use crate::error::CommerceError;
use crate::ids::CatalogId;
use crate::money::{Currency, Money};

/// Store key holding the cart snapshot.
pub const CART_KEY: &str = "cart";

/// What an [`CartStore::update_quantity`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The entry now has this quantity.
    Updated(i64),
    /// A non-positive quantity removed the entry.
    Removed,
    /// No entry had that identity; nothing changed.
    Absent,
}

/// Ordered line items with write-through persistence.
///
/// The only way to get a `CartStore` is [`CartStore::load`], so hydration
/// always finishes before the first mutation. Every mutation writes the
/// whole snapshot under [`CART_KEY`]. A write that fails leaves memory
/// untouched and marks the store dirty until the next successful write.
#[derive(Debug)]
pub struct CartStore {
    items: Vec<LineItem>,
    cache: Cache,
    currency: Currency,
    generation: u64,
    dirty: bool,
}

impl CartStore {
    /// Hydrate the cart from `cache`.
    ///
    /// Never fails: a missing, unreadable or invalid snapshot yields an
    /// empty cart.
    pub async fn load(cache: Cache, currency: Currency) -> Self {
        let items = read_snapshot(&cache, currency).await;
        tracing::debug!(entries = items.len(), "cart loaded");
        Self {
            items,
            cache,
            currency,
            generation: 0,
            dirty: false,
        }
    }

    /// Add one unit of `item` in `variant`.
    ///
    /// An existing entry with the same identity gains one unit; otherwise a
    /// new unselected entry with quantity 1 is appended. Returns the entry
    /// as it now stands.
    pub async fn add(
        &mut self,
        item: &CatalogItem,
        variant: Option<&str>,
    ) -> Result<LineItem, CommerceError> {
        check_variant(item, variant)?;
        if item.unit_price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: item.unit_price.currency.code().to_string(),
            });
        }

        let entry = match self.position(&item.id, variant) {
            Some(index) => {
                let existing = &mut self.items[index];
                existing.increment()?;
                existing.clone()
            }
            None => {
                let entry = LineItem::from_catalog(item, variant);
                self.items.push(entry.clone());
                entry
            }
        };

        tracing::debug!(
            catalog_id = %entry.catalog_id,
            variant = entry.variant.as_deref().unwrap_or(""),
            quantity = entry.quantity,
            "added to cart"
        );
        self.commit().await;
        Ok(entry)
    }

    /// Replace the quantity of an entry.
    ///
    /// A quantity of zero or less removes the entry. An unknown identity is
    /// a no-op.
    pub async fn update_quantity(
        &mut self,
        catalog_id: &CatalogId,
        variant: Option<&str>,
        quantity: i64,
    ) -> Result<QuantityChange, CommerceError> {
        let Some(index) = self.position(catalog_id, variant) else {
            return Ok(QuantityChange::Absent);
        };

        if quantity <= 0 {
            self.items.remove(index);
            tracing::debug!(catalog_id = %catalog_id, "removed from cart by quantity");
            self.commit().await;
            return Ok(QuantityChange::Removed);
        }

        validate_quantity(quantity)?;
        self.items[index].quantity = quantity;
        tracing::debug!(catalog_id = %catalog_id, quantity, "cart quantity updated");
        self.commit().await;
        Ok(QuantityChange::Updated(quantity))
    }

    /// Remove an entry. Returns whether anything was removed.
    pub async fn remove(&mut self, catalog_id: &CatalogId, variant: Option<&str>) -> bool {
        let Some(index) = self.position(catalog_id, variant) else {
            return false;
        };
        self.items.remove(index);
        tracing::debug!(catalog_id = %catalog_id, "removed from cart");
        self.commit().await;
        true
    }

    /// Flip the checkout selection of one entry.
    ///
    /// Returns the new selection state, or `None` if no entry matched.
    pub async fn toggle_select(
        &mut self,
        catalog_id: &CatalogId,
        variant: Option<&str>,
    ) -> Option<bool> {
        let index = self.position(catalog_id, variant)?;
        let entry = &mut self.items[index];
        entry.selected = !entry.selected;
        let selected = entry.selected;
        tracing::debug!(catalog_id = %catalog_id, selected, "cart selection toggled");
        self.commit().await;
        Some(selected)
    }

    /// Empty the cart.
    pub async fn clear(&mut self) {
        self.items.clear();
        tracing::debug!("cart cleared");
        self.commit().await;
    }

    /// Remove exactly the entries that were purchased.
    ///
    /// Returns how many entries were removed.
    pub async fn reconcile_after_checkout(&mut self, purchased: &[LineIdentity]) -> usize {
        let before = self.items.len();
        self.items
            .retain(|item| !purchased.iter().any(|id| id.matches(&item.catalog_id, item.variant.as_deref())));
        let removed = before - self.items.len();
        if removed > 0 {
            tracing::debug!(removed, "cart reconciled after checkout");
            self.commit().await;
        }
        removed
    }

    /// Sum of line totals over `view`.
    pub fn subtotal(&self, view: CartView) -> Result<Money, CommerceError> {
        compute_subtotal(self.items.iter().filter(|item| view.includes(item)), self.currency)
    }

    /// Total units across all entries, for the cart badge.
    pub fn quantity_total(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Entries in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Entries marked for checkout.
    pub fn selected_items(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter().filter(|item| item.selected)
    }

    /// Look up one entry.
    pub fn get(&self, catalog_id: &CatalogId, variant: Option<&str>) -> Option<&LineItem> {
        self.items.iter().find(|item| item.is(catalog_id, variant))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Currency every entry is priced in.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Mutation counter; bumped by every change to the entries.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Check if the last write failed and has not been retried successfully.
    pub fn has_pending_write(&self) -> bool {
        self.dirty
    }

    /// Retry a failed write.
    ///
    /// Does nothing when the stored snapshot is already current.
    pub async fn flush(&mut self) -> Result<(), CommerceError> {
        if !self.dirty {
            return Ok(());
        }
        self.cache
            .set(CART_KEY, &self.items)
            .await
            .map_err(|e| CommerceError::write_failed(CART_KEY, &e))?;
        self.dirty = false;
        tracing::debug!("pending cart write flushed");
        Ok(())
    }

    /// A detached reader stamped with the current generation.
    ///
    /// The reader owns its own cache handle, so it can run on another task
    /// while this store keeps accepting mutations.
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            cache: self.cache.clone(),
            currency: self.currency,
            generation: self.generation,
        }
    }

    /// Install a snapshot fetched by a [`SnapshotReader`].
    ///
    /// The snapshot is discarded if the cart changed after the reader was
    /// taken, or if a local write is still pending. Returns whether it was
    /// installed.
    pub fn apply_snapshot(&mut self, snapshot: LoadedSnapshot) -> bool {
        if snapshot.generation != self.generation || self.dirty {
            tracing::debug!(
                reader_generation = snapshot.generation,
                generation = self.generation,
                pending_write = self.dirty,
                "discarding stale cart snapshot"
            );
            return false;
        }
        self.items = snapshot.items;
        true
    }

    /// Re-read the stored snapshot and install it if still current.
    pub async fn reload(&mut self) -> bool {
        let snapshot = self.reader().fetch().await;
        self.apply_snapshot(snapshot)
    }

    fn position(&self, catalog_id: &CatalogId, variant: Option<&str>) -> Option<usize> {
        self.items.iter().position(|item| item.is(catalog_id, variant))
    }

    async fn commit(&mut self) {
        self.generation += 1;
        match self.cache.set(CART_KEY, &self.items).await {
            Ok(()) => self.dirty = false,
            Err(e) => {
                tracing::warn!(key = CART_KEY, error = %e, "cart write failed; keeping in-memory state");
                self.dirty = true;
            }
        }
    }
}

/// Reads the stored cart without borrowing the [`CartStore`].
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    cache: Cache,
    currency: Currency,
    generation: u64,
}

impl SnapshotReader {
    /// Generation the reader was taken at.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Read the snapshot, failing open to an empty list.
    pub async fn fetch(self) -> LoadedSnapshot {
        LoadedSnapshot {
            generation: self.generation,
            items: read_snapshot(&self.cache, self.currency).await,
        }
    }
}

/// Entries read by a [`SnapshotReader`], not yet installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSnapshot {
    pub generation: u64,
    pub items: Vec<LineItem>,
}

fn check_variant(item: &CatalogItem, variant: Option<&str>) -> Result<(), CommerceError> {
    match variant {
        None if item.has_variants() => Err(CommerceError::VariantRequired(item.id.to_string())),
        None => Ok(()),
        Some(v) if item.offers_variant(v) => Ok(()),
        Some(v) => Err(CommerceError::UnknownVariant {
            catalog_id: item.id.to_string(),
            variant: v.to_string(),
        }),
    }
}

async fn read_snapshot(cache: &Cache, currency: Currency) -> Vec<LineItem> {
    let items = match cache.get::<Vec<LineItem>>(CART_KEY).await {
        Ok(Some(items)) => items,
        Ok(None) => return Vec::new(),
        Err(e) if e.is_corrupt() => {
            let error = CommerceError::read_corrupt(CART_KEY, &e);
            tracing::warn!(key = CART_KEY, error = %error, "ignoring cart snapshot");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(key = CART_KEY, error = %e, "cart read failed; starting empty");
            return Vec::new();
        }
    };

    match check_snapshot(&items, currency) {
        Ok(()) => items,
        Err(reason) => {
            let error = CommerceError::read_corrupt(CART_KEY, reason);
            tracing::warn!(key = CART_KEY, error = %error, "ignoring cart snapshot");
            Vec::new()
        }
    }
}

fn check_snapshot(items: &[LineItem], currency: Currency) -> Result<(), String> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        validate_quantity(item.quantity).map_err(|e| format!("{}: {}", item.identity(), e))?;
        if item.unit_price.currency != currency {
            return Err(format!(
                "{} priced in {}, cart is in {}",
                item.identity(),
                item.unit_price.currency.code(),
                currency.code()
            ));
        }
        if !seen.insert(item.identity()) {
            return Err(format!("duplicate entry {}", item.identity()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shop_cache::MemoryStore;

    use super::*;

    fn shirt() -> CatalogItem {
        CatalogItem::new("shirt", "Linen Shirt", Money::new(150000, Currency::VND))
            .with_variants(["S", "M", "L"])
    }

    fn tote() -> CatalogItem {
        CatalogItem::new("tote", "Canvas Tote", Money::new(90000, Currency::VND))
    }

    fn cache() -> Cache {
        Cache::new(Arc::new(MemoryStore::new()))
    }

    async fn empty_cart() -> CartStore {
        CartStore::load(cache(), Currency::VND).await
    }

    #[tokio::test]
    async fn test_add_merges_same_identity() {
        let mut cart = empty_cart().await;
        cart.add(&shirt(), Some("M")).await.unwrap();
        let entry = cart.add(&shirt(), Some("M")).await.unwrap();

        assert_eq!(entry.quantity, 2);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_total(), 2);
    }

    #[tokio::test]
    async fn test_add_distinct_variants() {
        let mut cart = empty_cart().await;
        cart.add(&shirt(), Some("S")).await.unwrap();
        cart.add(&shirt(), Some("M")).await.unwrap();
        cart.add(&tote(), None).await.unwrap();

        assert_eq!(cart.len(), 3);
        let ids: Vec<_> = cart.items().iter().map(LineItem::identity).collect();
        assert_eq!(ids[0], LineIdentity::new("shirt", Some("S")));
        assert_eq!(ids[2], LineIdentity::new("tote", None));
    }

    #[tokio::test]
    async fn test_add_checks_variant() {
        let mut cart = empty_cart().await;
        assert!(matches!(
            cart.add(&shirt(), None).await,
            Err(CommerceError::VariantRequired(_))
        ));
        assert!(matches!(
            cart.add(&shirt(), Some("XXL")).await,
            Err(CommerceError::UnknownVariant { .. })
        ));
        assert!(matches!(
            cart.add(&tote(), Some("M")).await,
            Err(CommerceError::UnknownVariant { .. })
        ));
        assert!(cart.is_empty());
        assert_eq!(cart.generation(), 0);
    }

    #[tokio::test]
    async fn test_add_rejects_foreign_currency() {
        let mut cart = empty_cart().await;
        let cap = CatalogItem::new("cap", "Cap", Money::new(1500, Currency::USD));
        assert!(matches!(
            cart.add(&cap, None).await,
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_quantity() {
        let mut cart = empty_cart().await;
        cart.add(&tote(), None).await.unwrap();
        let id = CatalogId::new("tote");

        assert_eq!(
            cart.update_quantity(&id, None, 4).await.unwrap(),
            QuantityChange::Updated(4)
        );
        assert_eq!(cart.quantity_total(), 4);
        assert_eq!(
            cart.update_quantity(&id, Some("M"), 2).await.unwrap(),
            QuantityChange::Absent
        );
        assert!(matches!(
            cart.update_quantity(&id, None, 10_000).await,
            Err(CommerceError::QuantityExceedsLimit(10_000, _))
        ));
        assert_eq!(
            cart.update_quantity(&id, None, 0).await.unwrap(),
            QuantityChange::Removed
        );
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_remove_and_toggle() {
        let mut cart = empty_cart().await;
        cart.add(&shirt(), Some("S")).await.unwrap();
        cart.add(&shirt(), Some("M")).await.unwrap();
        let id = CatalogId::new("shirt");

        assert_eq!(cart.toggle_select(&id, Some("S")).await, Some(true));
        assert!(!cart.get(&id, Some("M")).unwrap().selected);
        assert_eq!(cart.toggle_select(&id, Some("XL")).await, None);

        assert!(cart.remove(&id, Some("S")).await);
        assert!(!cart.remove(&id, Some("S")).await);
        assert_eq!(cart.len(), 1);
    }

    #[tokio::test]
    async fn test_subtotal_views() {
        let mut cart = empty_cart().await;
        cart.add(&shirt(), Some("M")).await.unwrap();
        cart.add(&shirt(), Some("M")).await.unwrap();
        cart.add(&tote(), None).await.unwrap();
        cart.toggle_select(&CatalogId::new("tote"), None).await;

        assert_eq!(cart.subtotal(CartView::All).unwrap().amount_minor, 390000);
        assert_eq!(cart.subtotal(CartView::Selected).unwrap().amount_minor, 90000);
        assert_eq!(cart.selected_items().count(), 1);
    }

    #[tokio::test]
    async fn test_reconcile_removes_purchased_only() {
        let mut cart = empty_cart().await;
        cart.add(&shirt(), Some("S")).await.unwrap();
        cart.add(&shirt(), Some("M")).await.unwrap();
        cart.add(&tote(), None).await.unwrap();

        let removed = cart
            .reconcile_after_checkout(&[
                LineIdentity::new("shirt", Some("S")),
                LineIdentity::new("tote", None),
            ])
            .await;

        assert_eq!(removed, 2);
        assert_eq!(cart.items()[0].identity(), LineIdentity::new("shirt", Some("M")));
    }

    #[tokio::test]
    async fn test_state_survives_reload() {
        let cache = cache();
        let mut cart = CartStore::load(cache.clone(), Currency::VND).await;
        cart.add(&shirt(), Some("L")).await.unwrap();
        cart.toggle_select(&CatalogId::new("shirt"), Some("L")).await;

        let reloaded = CartStore::load(cache, Currency::VND).await;
        assert_eq!(reloaded.items(), cart.items());
    }

    #[tokio::test]
    async fn test_clear_persists_empty() {
        let cache = cache();
        let mut cart = CartStore::load(cache.clone(), Currency::VND).await;
        cart.add(&tote(), None).await.unwrap();
        cart.clear().await;

        let stored: Option<Vec<LineItem>> = cache.get(CART_KEY).await.unwrap();
        assert_eq!(stored, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_loads_empty() {
        let cache = cache();
        cache.set(CART_KEY, "not a cart").await.unwrap();
        assert!(CartStore::load(cache, Currency::VND).await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_snapshot_loads_empty() {
        let cache = cache();
        let mut entry = LineItem::from_catalog(&tote(), None);
        cache.set(CART_KEY, &vec![entry.clone(), entry.clone()]).await.unwrap();
        assert!(CartStore::load(cache.clone(), Currency::VND).await.is_empty());

        entry.quantity = 0;
        cache.set(CART_KEY, &vec![entry]).await.unwrap();
        assert!(CartStore::load(cache, Currency::VND).await.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_in_other_currency_loads_empty() {
        let cache = cache();
        let mut cart = CartStore::load(cache.clone(), Currency::VND).await;
        cart.add(&tote(), None).await.unwrap();

        let mut cart = CartStore::load(cache.clone(), Currency::USD).await;
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(CartView::All).unwrap(), Money::zero(Currency::USD));

        let cap = CatalogItem::new("cap", "Cap", Money::new(1500, Currency::USD));
        cart.add(&cap, None).await.unwrap();
        assert_eq!(cart.subtotal(CartView::All).unwrap().amount_minor, 1500);
        assert_eq!(CartStore::load(cache, Currency::USD).await.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_reader_is_discarded() {
        let mut cart = empty_cart().await;
        let reader = cart.reader();
        let snapshot = reader.fetch().await;

        cart.add(&tote(), None).await.unwrap();

        assert!(!cart.apply_snapshot(snapshot));
        assert_eq!(cart.len(), 1);
    }

    #[tokio::test]
    async fn test_reload_picks_up_external_write() {
        let cache = cache();
        let mut cart = CartStore::load(cache.clone(), Currency::VND).await;
        cache
            .set(CART_KEY, &vec![LineItem::from_catalog(&tote(), None)])
            .await
            .unwrap();

        assert!(cart.reload().await);
        assert_eq!(cart.len(), 1);
    }

    #[tokio::test]
    async fn test_flush_when_clean_is_noop() {
        let mut cart = empty_cart().await;
        assert!(!cart.has_pending_write());
        cart.flush().await.unwrap();
    }
}
