//! Catalog item type.

use serde::{Deserialize, Serialize};

use crate::ids::CatalogId;
use crate::money::Money;

/// A product as published by the catalog source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Opaque unique identifier.
    pub id: CatalogId,
    /// Display name.
    pub name: String,
    /// Price per unit. Never negative.
    pub unit_price: Money,
    /// Image reference (URL or asset key).
    #[serde(default)]
    pub image_ref: Option<String>,
    /// Long description.
    #[serde(default)]
    pub description: Option<String>,
    /// Ordered sizes/variants on offer. Empty means the item has no variant axis.
    #[serde(default)]
    pub available_variants: Vec<String>,
}

impl CatalogItem {
    /// Create an item with no variants.
    pub fn new(id: impl Into<CatalogId>, name: impl Into<String>, unit_price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            image_ref: None,
            description: None,
            available_variants: Vec::new(),
        }
    }

    /// Set the variants on offer.
    pub fn with_variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available_variants = variants.into_iter().map(Into::into).collect();
        self
    }

    /// Set the image reference.
    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    /// Check if the item has a variant axis.
    pub fn has_variants(&self) -> bool {
        !self.available_variants.is_empty()
    }

    /// Check if `variant` is one of the offered variants.
    pub fn offers_variant(&self, variant: &str) -> bool {
        self.available_variants.iter().any(|v| v == variant)
    }
}

/// Filter items whose name contains `text`, ignoring case.
///
/// Blank text matches everything, as the search bar does when cleared.
pub fn search_by_name<'a>(items: &'a [CatalogItem], text: &str) -> Vec<&'a CatalogItem> {
    let needle = text.trim().to_lowercase();
    items
        .iter()
        .filter(|item| needle.is_empty() || item.name.to_lowercase().contains(&needle))
        .collect()
}
