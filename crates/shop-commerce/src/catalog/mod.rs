//! Product catalog module.
//!
//! Catalog items are read-only here; they come from an external
//! [`CatalogSource`] and are only consumed by the cart and favorites.

mod item;
mod source;

pub use item::{search_by_name, CatalogItem};
pub use source::{load_catalog, CatalogSource, JsonFileCatalog, StaticCatalog};
