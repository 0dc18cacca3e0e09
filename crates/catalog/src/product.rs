use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{Entity, Money, RecordId, StoreError, StoreResult};

use crate::supplier::SupplierId;

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub RecordId);

impl ProductId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Product image identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub RecordId);

impl ImageId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ImageId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Row: sellable product.
///
/// # Invariants
/// - `sku` is non-empty and unique across the catalog (uniqueness is the
///   store's index; this row guarantees shape).
/// - `price` is non-negative by `Money`'s construction.
/// - Deletion is blocked once any order item cites the product; price changes
///   never rewrite history because order items snapshot the unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    sku: String,
    name: String,
    description: Option<String>,
    price: Money,
    weight_grams: u32,
    supplier_id: Option<SupplierId>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ProductId,
        sku: &str,
        name: &str,
        description: Option<&str>,
        price: Money,
        weight_grams: u32,
        supplier_id: Option<SupplierId>,
        now: DateTime<Utc>,
    ) -> StoreResult<Self> {
        if sku.trim().is_empty() {
            return Err(StoreError::constraint("SKU cannot be empty"));
        }
        if name.trim().is_empty() {
            return Err(StoreError::constraint("product name cannot be empty"));
        }

        Ok(Self {
            id,
            sku: sku.trim().to_string(),
            name: name.trim().to_string(),
            description: description.map(str::to_string),
            price,
            weight_grams,
            supplier_id,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn weight_grams(&self) -> u32 {
        self.weight_grams
    }

    pub fn supplier_id(&self) -> Option<SupplierId> {
        self.supplier_id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Reprice the product. Historical order items are unaffected; they carry
    /// their own snapshot of the unit price.
    pub fn set_price(&mut self, price: Money, now: DateTime<Utc>) {
        self.price = price;
        self.updated_at = now;
    }

    pub fn set_active(&mut self, active: bool, now: DateTime<Utc>) {
        self.active = active;
        self.updated_at = now;
    }

    /// Detach from a supplier (e.g., when the supplier row is deleted).
    pub fn set_supplier(&mut self, supplier_id: Option<SupplierId>, now: DateTime<Utc>) {
        self.supplier_id = supplier_id;
        self.updated_at = now;
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Row: product image (N:1, owned by the product).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    id: ImageId,
    product_id: ProductId,
    url: String,
    alt_text: Option<String>,
    sort_order: u32,
}

impl ProductImage {
    pub fn new(
        id: ImageId,
        product_id: ProductId,
        url: &str,
        alt_text: Option<&str>,
        sort_order: u32,
    ) -> StoreResult<Self> {
        if url.trim().is_empty() {
            return Err(StoreError::constraint("image url cannot be empty"));
        }

        Ok(Self {
            id,
            product_id,
            url: url.trim().to_string(),
            alt_text: alt_text.map(str::to_string),
            sort_order,
        })
    }

    pub fn id_typed(&self) -> ImageId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn alt_text(&self) -> Option<&str> {
        self.alt_text.as_deref()
    }

    pub fn sort_order(&self) -> u32 {
        self.sort_order
    }
}

impl Entity for ProductImage {
    type Id = ImageId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
