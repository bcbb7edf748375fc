//! Product and variant types.

use crate::ids::{ProductId, VariantId};
use crate::money::Money;
use crate::CommerceError;
use serde::{Deserialize, Serialize};

/// A product in the local catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Identifier of the product in the provider's catalog.
    pub external_id: String,
    /// Product title.
    pub title: String,
    /// Variant snapshot from the last successful sync.
    pub variants: Vec<Variant>,
    /// Unix timestamp of the last successful sync.
    pub last_synced_at: Option<i64>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Product {
    /// Create a product that has never been synced.
    pub fn new(id: ProductId, external_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = current_timestamp();
        Self {
            id,
            external_id: external_id.into(),
            title: title.into(),
            variants: Vec::new(),
            last_synced_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Look up a variant by id.
    pub fn variant(&self, variant_id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| &v.id == variant_id)
    }

    /// Look up a variant, failing with a domain error.
    pub fn require_variant(&self, variant_id: &VariantId) -> Result<&Variant, CommerceError> {
        self.variant(variant_id)
            .ok_or_else(|| CommerceError::VariantNotFound {
                product_id: self.id.to_string(),
                variant_id: variant_id.to_string(),
            })
    }

    /// Variants a customer can buy right now.
    pub fn purchasable_variants(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter().filter(|v| v.is_purchasable())
    }

    /// Check if at least one variant can be bought.
    pub fn is_in_stock(&self) -> bool {
        self.purchasable_variants().next().is_some()
    }
}

/// A sellable configuration of a product (size and color).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    /// Identifier of the variant in the provider's catalog.
    pub id: VariantId,
    /// Human-readable title (e.g. "Castle Tee / M / Black").
    pub title: String,
    /// Whether the provider can currently fulfil this variant.
    pub available: bool,
    /// Whether the variant is enabled for sale in the store.
    pub enabled: bool,
    /// Current retail price.
    pub price: Money,
    /// The provider no longer lists this variant.
    #[serde(default)]
    pub discontinued: bool,
}

impl Variant {
    /// Create an available, enabled variant.
    pub fn new(id: VariantId, title: impl Into<String>, price: Money) -> Self {
        Self {
            id,
            title: title.into(),
            available: true,
            enabled: true,
            price,
            discontinued: false,
        }
    }

    /// Set availability.
    pub fn with_availability(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Set the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Available, enabled and still listed.
    pub fn is_purchasable(&self) -> bool {
        self.available && self.enabled && !self.discontinued
    }

    /// Flag the variant as no longer listed by the provider.
    pub fn discontinue(&mut self) {
        self.available = false;
        self.enabled = false;
        self.discontinued = true;
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
