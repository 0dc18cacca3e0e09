//! JSON snapshot persistence: the durable form of the whole table state.
//!
//! A snapshot is a plain serializable struct; restoring one re-validates the
//! referential integrity the live store enforces incrementally, so a
//! hand-edited or corrupted snapshot cannot smuggle orphaned rows past the
//! integrity rules.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_catalog::{Category, CategoryId, Product, ProductId, ProductImage, Supplier};
use storefront_core::StoreError;
use storefront_identity::{Address, User, UserId, UserProfile};
use storefront_inventory::{InventoryRow, Warehouse};
use storefront_orders::{Order, Payment};
use storefront_reviews::Review;

use crate::tables::{Store, Tables, MAX_CATEGORY_DEPTH};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot codec failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot integrity: {0}")]
    Integrity(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Serializable image of every table plus the order-number counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub users: Vec<User>,
    pub profiles: Vec<UserProfile>,
    pub addresses: Vec<Address>,
    pub suppliers: Vec<Supplier>,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub images: Vec<ProductImage>,
    pub product_categories: Vec<(ProductId, CategoryId)>,
    pub warehouses: Vec<Warehouse>,
    pub inventory: Vec<InventoryRow>,
    pub orders: Vec<Order>,
    pub payments: Vec<Payment>,
    pub reviews: Vec<Review>,
    pub next_order_number: u64,
}

impl Store {
    /// Capture the current state. Rows are ordered by id so equal states
    /// produce byte-identical snapshots.
    pub fn snapshot(&self) -> Result<StoreSnapshot, SnapshotError> {
        let tables = self.read()?;

        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by_key(|r| *r.id_typed().0.as_uuid());
        let mut profiles: Vec<UserProfile> = tables.profiles.values().cloned().collect();
        profiles.sort_by_key(|r| *r.user_id().0.as_uuid());
        let mut addresses: Vec<Address> = tables.addresses.values().cloned().collect();
        addresses.sort_by_key(|r| *r.id_typed().0.as_uuid());
        let mut suppliers: Vec<Supplier> = tables.suppliers.values().cloned().collect();
        suppliers.sort_by_key(|r| *r.id_typed().0.as_uuid());
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by_key(|r| *r.id_typed().0.as_uuid());
        let mut products: Vec<Product> = tables.products.values().cloned().collect();
        products.sort_by_key(|r| *r.id_typed().0.as_uuid());
        let mut images: Vec<ProductImage> = tables.images.values().cloned().collect();
        images.sort_by_key(|r| *r.id_typed().0.as_uuid());
        let mut product_categories: Vec<(ProductId, CategoryId)> =
            tables.product_categories.iter().copied().collect();
        product_categories.sort_by_key(|(p, c)| (*p.0.as_uuid(), *c.0.as_uuid()));
        let mut warehouses: Vec<Warehouse> = tables.warehouses.values().cloned().collect();
        warehouses.sort_by_key(|r| *r.id_typed().0.as_uuid());
        let mut inventory: Vec<InventoryRow> = tables.inventory.values().cloned().collect();
        inventory.sort_by_key(|r| (*r.product_id().0.as_uuid(), *r.warehouse_id().0.as_uuid()));
        let mut orders: Vec<Order> = tables.orders.values().cloned().collect();
        orders.sort_by_key(|r| *r.id_typed().0.as_uuid());
        let mut payments: Vec<Payment> = tables.payments.values().cloned().collect();
        payments.sort_by_key(|r| *r.id_typed().0.as_uuid());
        let mut reviews: Vec<Review> = tables.reviews.values().cloned().collect();
        reviews.sort_by_key(|r| *r.id_typed().0.as_uuid());

        Ok(StoreSnapshot {
            users,
            profiles,
            addresses,
            suppliers,
            categories,
            products,
            images,
            product_categories,
            warehouses,
            inventory,
            orders,
            payments,
            reviews,
            next_order_number: tables.next_order_number,
        })
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(&self.snapshot()?)?)
    }

    /// Rebuild a store from a snapshot, re-validating every integrity rule
    /// before any state is accepted.
    pub fn restore(snapshot: StoreSnapshot) -> Result<Store, SnapshotError> {
        validate(&snapshot)?;

        let mut tables = Tables::default();
        for user in snapshot.users {
            tables.emails.insert(user.email().to_string(), user.id_typed());
            tables.users.insert(user.id_typed(), user);
        }
        for profile in snapshot.profiles {
            tables.profiles.insert(profile.user_id(), profile);
        }
        for address in snapshot.addresses {
            tables.addresses.insert(address.id_typed(), address);
        }
        for supplier in snapshot.suppliers {
            tables.suppliers.insert(supplier.id_typed(), supplier);
        }
        for category in snapshot.categories {
            tables
                .category_names
                .insert(category.name().to_string(), category.id_typed());
            tables
                .category_slugs
                .insert(category.slug().to_string(), category.id_typed());
            tables.categories.insert(category.id_typed(), category);
        }
        for product in snapshot.products {
            tables.skus.insert(product.sku().to_string(), product.id_typed());
            tables.products.insert(product.id_typed(), product);
        }
        for image in snapshot.images {
            tables.images.insert(image.id_typed(), image);
        }
        tables.product_categories = snapshot.product_categories.into_iter().collect();
        for warehouse in snapshot.warehouses {
            tables.warehouses.insert(warehouse.id_typed(), warehouse);
        }
        for row in snapshot.inventory {
            tables
                .inventory
                .insert((row.product_id(), row.warehouse_id()), row);
        }
        for order in snapshot.orders {
            tables
                .order_numbers
                .insert(order.order_number().to_string(), order.id_typed());
            tables.orders.insert(order.id_typed(), order);
        }
        for payment in snapshot.payments {
            tables.payments.insert(payment.id_typed(), payment);
        }
        for review in snapshot.reviews {
            tables.reviews.insert(review.id_typed(), review);
        }
        tables.next_order_number = snapshot.next_order_number;

        Ok(Store {
            tables: std::sync::RwLock::new(tables),
        })
    }

    pub fn from_json(json: &str) -> Result<Store, SnapshotError> {
        Self::restore(serde_json::from_str(json)?)
    }
}

fn integrity(msg: impl Into<String>) -> SnapshotError {
    SnapshotError::Integrity(msg.into())
}

fn unique<'a, I>(values: I, what: &str) -> Result<(), SnapshotError>
where
    I: Iterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(integrity(format!("duplicate {what}: {value}")));
        }
    }
    Ok(())
}

fn validate(snapshot: &StoreSnapshot) -> Result<(), SnapshotError> {
    let user_ids: HashSet<_> = snapshot.users.iter().map(|u| u.id_typed()).collect();
    if user_ids.len() != snapshot.users.len() {
        return Err(integrity("duplicate user id"));
    }
    unique(snapshot.users.iter().map(|u| u.email()), "email")?;
    unique(snapshot.products.iter().map(|p| p.sku()), "sku")?;
    unique(snapshot.categories.iter().map(|c| c.name()), "category name")?;
    unique(snapshot.categories.iter().map(|c| c.slug()), "category slug")?;
    unique(
        snapshot.orders.iter().map(|o| o.order_number()),
        "order number",
    )?;

    for profile in &snapshot.profiles {
        if !user_ids.contains(&profile.user_id()) {
            return Err(integrity("profile references missing user"));
        }
    }
    let mut primaries: HashMap<UserId, usize> = HashMap::new();
    let address_ids: HashSet<_> = snapshot.addresses.iter().map(|a| a.id_typed()).collect();
    for address in &snapshot.addresses {
        if !user_ids.contains(&address.user_id()) {
            return Err(integrity("address references missing user"));
        }
        if address.is_primary() {
            let count = primaries.entry(address.user_id()).or_default();
            *count += 1;
            if *count > 1 {
                return Err(integrity("user has more than one primary address"));
            }
        }
    }

    let supplier_ids: HashSet<_> = snapshot.suppliers.iter().map(|s| s.id_typed()).collect();
    let product_ids: HashSet<_> = snapshot.products.iter().map(|p| p.id_typed()).collect();
    for product in &snapshot.products {
        if let Some(supplier_id) = product.supplier_id() {
            if !supplier_ids.contains(&supplier_id) {
                return Err(integrity("product references missing supplier"));
            }
        }
    }

    let parents: HashMap<_, _> = snapshot
        .categories
        .iter()
        .map(|c| (c.id_typed(), c.parent_id()))
        .collect();
    for category in &snapshot.categories {
        let mut cursor = category.parent_id();
        let mut depth = 0usize;
        while let Some(current) = cursor {
            if current == category.id_typed() {
                return Err(integrity(format!(
                    "category {} sits on its own ancestor chain",
                    category.slug()
                )));
            }
            depth += 1;
            if depth > MAX_CATEGORY_DEPTH {
                return Err(integrity("category ancestor chain exceeds max depth"));
            }
            cursor = match parents.get(&current) {
                Some(parent) => *parent,
                None => return Err(integrity("category references missing parent")),
            };
        }
    }

    for image in &snapshot.images {
        if !product_ids.contains(&image.product_id()) {
            return Err(integrity("image references missing product"));
        }
    }
    let category_ids: HashSet<_> = snapshot.categories.iter().map(|c| c.id_typed()).collect();
    for (product_id, category_id) in &snapshot.product_categories {
        if !product_ids.contains(product_id) || !category_ids.contains(category_id) {
            return Err(integrity("product/category link references missing row"));
        }
    }

    let warehouse_ids: HashSet<_> = snapshot.warehouses.iter().map(|w| w.id_typed()).collect();
    let mut pairs = HashSet::new();
    for row in &snapshot.inventory {
        if !product_ids.contains(&row.product_id()) {
            return Err(integrity("inventory row references missing product"));
        }
        if !warehouse_ids.contains(&row.warehouse_id()) {
            return Err(integrity("inventory row references missing warehouse"));
        }
        if row.quantity() < 0 {
            return Err(integrity("inventory row carries a negative quantity"));
        }
        if !pairs.insert((row.product_id(), row.warehouse_id())) {
            return Err(integrity("duplicate inventory row for one pair"));
        }
    }

    let order_ids: HashSet<_> = snapshot.orders.iter().map(|o| o.id_typed()).collect();
    for order in &snapshot.orders {
        if !user_ids.contains(&order.user_id()) {
            return Err(integrity("order references missing user"));
        }
        for address_id in [order.shipping_address_id(), order.billing_address_id()]
            .into_iter()
            .flatten()
        {
            if !address_ids.contains(&address_id) {
                return Err(integrity("order references missing address"));
            }
        }
        for item in order.items() {
            if !product_ids.contains(&item.product_id()) {
                return Err(integrity("order item references missing product"));
            }
        }
        if let Some(seq) = order
            .order_number()
            .strip_prefix("ORD-")
            .and_then(|s| s.parse::<u64>().ok())
        {
            if seq > snapshot.next_order_number {
                return Err(integrity("order number is ahead of the counter"));
            }
        }
    }

    for payment in &snapshot.payments {
        if !order_ids.contains(&payment.order_id()) {
            return Err(integrity("payment references missing order"));
        }
    }
    for review in &snapshot.reviews {
        if !product_ids.contains(&review.product_id()) {
            return Err(integrity("review references missing product"));
        }
        if let Some(user_id) = review.user_id() {
            if !user_ids.contains(&user_id) {
                return Err(integrity("review references missing user"));
            }
        }
    }

    Ok(())
}
