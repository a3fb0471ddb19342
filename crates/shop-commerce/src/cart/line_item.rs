//! Line item value type and its identity rules.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::CatalogItem;
use crate::error::CommerceError;
use crate::ids::CatalogId;
use crate::money::Money;

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// What makes two line items the same cart entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineIdentity {
    pub catalog_id: CatalogId,
    pub variant: Option<String>,
}

impl LineIdentity {
    /// Build an identity from its parts.
    pub fn new(catalog_id: impl Into<CatalogId>, variant: Option<&str>) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            variant: variant.map(str::to_string),
        }
    }

    /// Check if this identity names `catalog_id` in `variant`.
    pub fn matches(&self, catalog_id: &CatalogId, variant: Option<&str>) -> bool {
        &self.catalog_id == catalog_id && self.variant.as_deref() == variant
    }
}

impl fmt::Display for LineIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            Some(variant) => write!(f, "{} ({})", self.catalog_id, variant),
            None => write!(f, "{}", self.catalog_id),
        }
    }
}

/// One priced, quantified entry in the cart.
///
/// Name, price and image are captured when the item is added, so later
/// catalog changes do not alter what is already in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub catalog_id: CatalogId,
    pub variant: Option<String>,
    pub quantity: i64,
    pub selected: bool,
    pub name: String,
    pub unit_price: Money,
    pub image_ref: Option<String>,
}

impl LineItem {
    /// Snapshot a catalog item as a new entry: quantity 1, not selected.
    pub fn from_catalog(item: &CatalogItem, variant: Option<&str>) -> Self {
        Self {
            catalog_id: item.id.clone(),
            variant: variant.map(str::to_string),
            quantity: 1,
            selected: false,
            name: item.name.clone(),
            unit_price: item.unit_price,
            image_ref: item.image_ref.clone(),
        }
    }

    /// The `(catalog_id, variant)` pair used for every equality and merge decision.
    pub fn identity(&self) -> LineIdentity {
        LineIdentity {
            catalog_id: self.catalog_id.clone(),
            variant: self.variant.clone(),
        }
    }

    /// Check if this entry has the given identity.
    pub fn is(&self, catalog_id: &CatalogId, variant: Option<&str>) -> bool {
        &self.catalog_id == catalog_id && self.variant.as_deref() == variant
    }

    /// Unit price times quantity.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.unit_price.checked_mul(self.quantity)
    }

    /// Replace the quantity, rejecting values outside `1..=MAX_QUANTITY_PER_ITEM`.
    pub fn set_quantity(&mut self, quantity: i64) -> Result<(), CommerceError> {
        validate_quantity(quantity)?;
        self.quantity = quantity;
        Ok(())
    }

    /// Add one unit.
    pub fn increment(&mut self) -> Result<(), CommerceError> {
        let next = self.quantity.checked_add(1).ok_or(CommerceError::Overflow)?;
        self.set_quantity(next)
    }
}

/// Check a quantity is a positive integer within the per-item limit.
pub fn validate_quantity(quantity: i64) -> Result<(), CommerceError> {
    if quantity <= 0 {
        return Err(CommerceError::InvalidQuantity(quantity));
    }
    if quantity > MAX_QUANTITY_PER_ITEM {
        return Err(CommerceError::QuantityExceedsLimit(
            quantity,
            MAX_QUANTITY_PER_ITEM,
        ));
    }
    Ok(())
}
