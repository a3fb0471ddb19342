//! Cart and favorites engine for a mobile storefront.
//!
//! - **Catalog**: catalog items, catalog sources, name search
//! - **Cart**: line items, the persistent cart store, pricing and discounts
//! - **Favorites**: per-item favorite flags
//! - **Checkout**: single-flight batch selection and cart settlement
//! - **Session**: one owned context bundling all of the above
//!
//! All state is persisted through a [`shop_cache::Cache`]. Reads fail open to
//! empty state; failed writes are kept in memory and retried.
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_commerce::prelude::*;
//!
//! let mut session = ShopSession::open_default(cache).await;
//! session.cart.add(&shirt, Some("M")).await?;
//! session.cart.toggle_select(&shirt.id, Some("M")).await;
//!
//! let batch_id = session.prepare_checkout(Some("NAT"))?.id.clone();
//! session.checkout.choose_payment(PaymentMethod::CashOnDelivery)?;
//! session.confirm_checkout(&batch_id).await?;
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod favorites;
pub mod profile;
pub mod session;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        load_catalog, search_by_name, CatalogItem, CatalogSource, JsonFileCatalog, StaticCatalog,
    };

    // Cart
    pub use crate::cart::{
        apply_discount, compute_subtotal, CartStore, CartView, CheckoutTotals, DiscountOutcome,
        DiscountResolver, DiscountTable, LineIdentity, LineItem, QuantityChange,
    };

    // Checkout
    pub use crate::checkout::{CheckoutBatch, CheckoutFlow, CheckoutState, PaymentMethod};

    pub use crate::favorites::FavoritesStore;
    pub use crate::profile::UserProfile;
    pub use crate::session::ShopSession;
}
