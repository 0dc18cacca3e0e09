//! Inventory ledger operations: per-location stock counts.

use chrono::Utc;

use storefront_catalog::ProductId;
use storefront_core::{RecordId, StoreError, StoreResult};
use storefront_inventory::{InventoryRow, Warehouse, WarehouseId};

use crate::tables::Store;

impl Store {
    pub fn create_warehouse(&self, name: &str, city: &str, country: &str) -> StoreResult<Warehouse> {
        let mut tables = self.write()?;
        let warehouse = Warehouse::new(WarehouseId::new(RecordId::new()), name, city, country)?;
        tables.warehouses.insert(warehouse.id_typed(), warehouse.clone());
        Ok(warehouse)
    }

    pub fn get_warehouse(&self, warehouse_id: WarehouseId) -> StoreResult<Warehouse> {
        let tables = self.read()?;
        tables
            .warehouses
            .get(&warehouse_id)
            .cloned()
            .ok_or(StoreError::not_found("warehouse"))
    }

    /// Apply a signed stock delta for one (product, warehouse) pair.
    ///
    /// A first adjustment creates the row with `quantity = max(0, delta)`;
    /// after that, deltas apply atomically and a decrement below zero fails
    /// with `InsufficientStock`, leaving the row unchanged. Concurrent calls
    /// on the same pair serialize on the table lock, so the bound cannot be
    /// raced.
    pub fn adjust_stock(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        delta: i64,
    ) -> StoreResult<InventoryRow> {
        let mut tables = self.write()?;
        if !tables.products.contains_key(&product_id) {
            return Err(StoreError::not_found("product"));
        }
        if !tables.warehouses.contains_key(&warehouse_id) {
            return Err(StoreError::not_found("warehouse"));
        }

        let now = Utc::now();
        let row = match tables.inventory.get_mut(&(product_id, warehouse_id)) {
            Some(row) => {
                row.apply_delta(delta, now)?;
                row.clone()
            }
            None => {
                let row = InventoryRow::opening(product_id, warehouse_id, delta, now);
                tables.inventory.insert((product_id, warehouse_id), row.clone());
                row
            }
        };

        tracing::debug!(%product_id, %warehouse_id, delta, quantity = row.quantity(), "stock adjusted");
        Ok(row)
    }

    /// Stock for one pair, treating an absent row as zero.
    pub fn stock_on_hand(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> StoreResult<i64> {
        let tables = self.read()?;
        if !tables.products.contains_key(&product_id) {
            return Err(StoreError::not_found("product"));
        }
        if !tables.warehouses.contains_key(&warehouse_id) {
            return Err(StoreError::not_found("warehouse"));
        }
        Ok(tables
            .inventory
            .get(&(product_id, warehouse_id))
            .map(InventoryRow::quantity)
            .unwrap_or(0))
    }

    /// Total stock for a product across every warehouse, which is the
    /// derived-stock definition for one product. A pure read: absent rows
    /// count as zero, and the sum reflects every committed row at call time.
    pub fn stock_across_warehouses(&self, product_id: ProductId) -> StoreResult<i64> {
        let tables = self.read()?;
        if !tables.products.contains_key(&product_id) {
            return Err(StoreError::not_found("product"));
        }
        Ok(tables
            .inventory
            .iter()
            .filter(|((p, _), _)| *p == product_id)
            .map(|(_, row)| row.quantity())
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::Money;

    fn seeded(store: &Store) -> (ProductId, WarehouseId) {
        let product = store
            .create_product("HAM-016", "Claw Hammer", None, Money::from_cents(1_299), 650, None)
            .unwrap();
        let warehouse = store.create_warehouse("Central", "Lyon", "FR").unwrap();
        (product.id_typed(), warehouse.id_typed())
    }

    #[test]
    fn adjust_stock_requires_both_ends_of_the_pair() {
        let store = Store::new();
        let (product_id, warehouse_id) = seeded(&store);

        let err = store
            .adjust_stock(ProductId::new(RecordId::new()), warehouse_id, 10)
            .unwrap_err();
        match err {
            StoreError::NotFound { entity: "product" } => {}
            _ => panic!("Expected NotFound for unknown product"),
        }

        let err = store
            .adjust_stock(product_id, WarehouseId::new(RecordId::new()), 10)
            .unwrap_err();
        match err {
            StoreError::NotFound { entity: "warehouse" } => {}
            _ => panic!("Expected NotFound for unknown warehouse"),
        }
    }

    #[test]
    fn first_adjustment_creates_the_row_clamped_at_zero() {
        let store = Store::new();
        let (product_id, warehouse_id) = seeded(&store);

        let row = store.adjust_stock(product_id, warehouse_id, -30).unwrap();
        assert_eq!(row.quantity(), 0);

        let row = store.adjust_stock(product_id, warehouse_id, 50).unwrap();
        assert_eq!(row.quantity(), 50);
    }

    #[test]
    fn overdraw_fails_and_keeps_the_row() {
        let store = Store::new();
        let (product_id, warehouse_id) = seeded(&store);
        store.adjust_stock(product_id, warehouse_id, 20).unwrap();

        let err = store.adjust_stock(product_id, warehouse_id, -30).unwrap_err();
        match err {
            StoreError::InsufficientStock { on_hand: 20, requested: -30 } => {}
            _ => panic!("Expected InsufficientStock"),
        }
        assert_eq!(store.stock_on_hand(product_id, warehouse_id).unwrap(), 20);
    }

    #[test]
    fn one_row_per_pair() {
        let store = Store::new();
        let (product_id, warehouse_id) = seeded(&store);
        store.adjust_stock(product_id, warehouse_id, 10).unwrap();
        store.adjust_stock(product_id, warehouse_id, 5).unwrap();

        let tables = store.read().unwrap();
        assert_eq!(tables.inventory.len(), 1);
        assert_eq!(tables.inventory[&(product_id, warehouse_id)].quantity(), 15);
    }

    #[test]
    fn stock_across_warehouses_sums_every_location() {
        let store = Store::new();
        let (product_id, first) = seeded(&store);
        let second = store.create_warehouse("North", "Lille", "FR").unwrap();

        store.adjust_stock(product_id, first, 30).unwrap();
        store.adjust_stock(product_id, second.id_typed(), 12).unwrap();

        assert_eq!(store.stock_across_warehouses(product_id).unwrap(), 42);
    }

    #[test]
    fn stock_across_warehouses_is_zero_without_rows() {
        let store = Store::new();
        let (product_id, _) = seeded(&store);
        assert_eq!(store.stock_across_warehouses(product_id).unwrap(), 0);
    }

    #[test]
    fn stock_across_warehouses_rejects_unknown_products() {
        let store = Store::new();
        let err = store
            .stock_across_warehouses(ProductId::new(RecordId::new()))
            .unwrap_err();
        match err {
            StoreError::NotFound { entity: "product" } => {}
            _ => panic!("Expected NotFound for unknown product"),
        }
    }
}
