//! One shopper's session: cart, favorites and checkout behind a single owner.

use std::sync::Arc;

use shop_cache::Cache;

use crate::cart::{CartStore, CheckoutTotals, DiscountResolver, DiscountTable};
use crate::checkout::{CheckoutBatch, CheckoutFlow};
use crate::error::CommerceError;
use crate::favorites::FavoritesStore;
use crate::ids::BatchId;
use crate::money::Currency;
use crate::profile::UserProfile;

/// Everything a storefront screen needs, handed around by reference.
pub struct ShopSession {
    cache: Cache,
    pub cart: CartStore,
    pub favorites: FavoritesStore,
    pub checkout: CheckoutFlow,
    resolver: Arc<dyn DiscountResolver>,
}

impl ShopSession {
    /// Hydrate cart and favorites from `cache`.
    pub async fn open(cache: Cache, currency: Currency, resolver: Arc<dyn DiscountResolver>) -> Self {
        let cart = CartStore::load(cache.clone(), currency).await;
        let favorites = FavoritesStore::load(cache.clone()).await;
        tracing::debug!(
            cart_entries = cart.len(),
            favorites = favorites.count(),
            "session opened"
        );
        Self {
            cache,
            cart,
            favorites,
            checkout: CheckoutFlow::new(),
            resolver,
        }
    }

    /// Open with the built-in discount table.
    pub async fn open_default(cache: Cache) -> Self {
        Self::open(cache, Currency::default(), Arc::new(DiscountTable::default())).await
    }

    pub fn resolver(&self) -> &dyn DiscountResolver {
        self.resolver.as_ref()
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Batch the selected cart entries.
    pub fn prepare_checkout(&mut self, code: Option<&str>) -> Result<&CheckoutBatch, CommerceError> {
        self.checkout.prepare(&self.cart, code, self.resolver.as_ref())
    }

    /// Batch the whole cart.
    pub fn prepare_whole_cart(&mut self, code: Option<&str>) -> Result<&CheckoutBatch, CommerceError> {
        self.checkout
            .prepare_whole_cart(&self.cart, code, self.resolver.as_ref())
    }

    /// Re-price the batch in flight with `code`.
    pub fn apply_code(&mut self, code: &str) -> Result<CheckoutTotals, CommerceError> {
        self.checkout.apply_code(code, self.resolver.as_ref())
    }

    /// Confirm the batch in flight and settle the cart.
    pub async fn confirm_checkout(&mut self, batch_id: &BatchId) -> Result<CheckoutBatch, CommerceError> {
        self.checkout.confirm(batch_id, &mut self.cart).await
    }

    pub async fn profile(&self) -> UserProfile {
        UserProfile::load(&self.cache).await
    }

    pub async fn save_profile(&self, profile: &UserProfile) -> Result<(), CommerceError> {
        profile.save(&self.cache).await
    }

    /// Retry every pending cart and favorite write.
    ///
    /// Both stores are attempted; the first failure is returned.
    pub async fn flush(&mut self) -> Result<(), CommerceError> {
        let cart = self.cart.flush().await;
        let favorites = self.favorites.flush().await;
        cart.and(favorites)
    }

    /// Check if any write is waiting for a retry.
    pub fn has_pending_writes(&self) -> bool {
        self.cart.has_pending_write() || self.favorites.has_pending_writes()
    }
}

impl std::fmt::Debug for ShopSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopSession")
            .field("cart", &self.cart)
            .field("favorites", &self.favorites)
            .field("checkout", &self.checkout)
            .finish_non_exhaustive()
    }
}
