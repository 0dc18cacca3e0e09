use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError};
use std::time::Duration;

use storefront_catalog::{Category, CategoryId, ImageId, Product, ProductId, ProductImage, Supplier, SupplierId};
use storefront_core::{StoreError, StoreResult};
use storefront_identity::{Address, AddressId, User, UserId, UserProfile};
use storefront_inventory::{InventoryRow, Warehouse, WarehouseId};
use storefront_orders::{Order, OrderId, Payment, PaymentId};
use storefront_reviews::{Review, ReviewId};

/// Bounded lock acquisition: attempts × backoff caps the wait at ~128ms.
const LOCK_ATTEMPTS: u32 = 64;
const LOCK_BACKOFF: Duration = Duration::from_millis(2);

/// Ancestor-chain walks give up past this depth; a deeper chain is treated
/// as a cycle rather than walked forever.
pub(crate) const MAX_CATEGORY_DEPTH: usize = 64;

/// Every logical collection, keyed as the data model states, plus the
/// uniqueness indexes maintained in the same critical section as the rows
/// they guard.
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub users: HashMap<UserId, User>,
    pub profiles: HashMap<UserId, UserProfile>,
    pub addresses: HashMap<AddressId, Address>,
    pub suppliers: HashMap<SupplierId, Supplier>,
    pub categories: HashMap<CategoryId, Category>,
    pub products: HashMap<ProductId, Product>,
    pub images: HashMap<ImageId, ProductImage>,
    /// M:N join, keyed by the pair; insertion of an existing pair is a no-op.
    pub product_categories: HashSet<(ProductId, CategoryId)>,
    pub warehouses: HashMap<WarehouseId, Warehouse>,
    /// One row per (product, warehouse) pair, the composite key.
    pub inventory: HashMap<(ProductId, WarehouseId), InventoryRow>,
    pub orders: HashMap<OrderId, Order>,
    pub payments: HashMap<PaymentId, Payment>,
    pub reviews: HashMap<ReviewId, Review>,

    pub emails: HashMap<String, UserId>,
    pub skus: HashMap<String, ProductId>,
    pub category_names: HashMap<String, CategoryId>,
    pub category_slugs: HashMap<String, CategoryId>,
    pub order_numbers: HashMap<String, OrderId>,

    pub next_order_number: u64,
}

impl Tables {
    /// Reject a parent edge whose ancestor chain would contain `category_id`.
    ///
    /// A foreign key cannot express "not an ancestor of itself"; this is the
    /// explicit walk, bounded by [`MAX_CATEGORY_DEPTH`].
    pub fn ensure_acyclic(
        &self,
        category_id: CategoryId,
        parent_id: Option<CategoryId>,
    ) -> StoreResult<()> {
        let mut cursor = parent_id;
        let mut depth = 0usize;
        while let Some(current) = cursor {
            if current == category_id {
                return Err(StoreError::cycle(format!(
                    "category {category_id} would become its own ancestor"
                )));
            }
            depth += 1;
            if depth > MAX_CATEGORY_DEPTH {
                return Err(StoreError::cycle(format!(
                    "ancestor chain exceeds depth {MAX_CATEGORY_DEPTH}"
                )));
            }
            cursor = self.categories.get(&current).and_then(Category::parent_id);
        }
        Ok(())
    }

    /// Sum of settled payment amounts for one order, in cents.
    pub fn settled_cents(&self, order_id: OrderId) -> u64 {
        self.payments
            .values()
            .filter(|p| p.order_id() == order_id && p.is_settled())
            .map(|p| p.amount().cents())
            .sum()
    }
}

/// The store: every table behind a single lock.
///
/// Writers serialize; readers run concurrently with each other and only ever
/// see fully-committed state. Construction starts empty; [`Store::restore`]
/// rebuilds one from a snapshot.
#[derive(Debug, Default)]
pub struct Store {
    pub(crate) tables: RwLock<Tables>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        for _ in 0..LOCK_ATTEMPTS {
            match self.tables.try_read() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::WouldBlock) => std::thread::sleep(LOCK_BACKOFF),
                Err(TryLockError::Poisoned(_)) => {
                    return Err(StoreError::contention("table lock poisoned"));
                }
            }
        }
        Err(StoreError::contention("read lock wait exhausted"))
    }

    pub(crate) fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        for _ in 0..LOCK_ATTEMPTS {
            match self.tables.try_write() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::WouldBlock) => std::thread::sleep(LOCK_BACKOFF),
                Err(TryLockError::Poisoned(_)) => {
                    return Err(StoreError::contention("table lock poisoned"));
                }
            }
        }
        Err(StoreError::contention("write lock wait exhausted"))
    }

    /// Allocate the next order number (caller holds the write guard).
    pub(crate) fn next_order_number(tables: &mut Tables) -> String {
        tables.next_order_number += 1;
        format!("ORD-{:08}", tables.next_order_number)
    }
}
