use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_catalog::ProductId;
use storefront_core::{StoreError, StoreResult};

use crate::warehouse::WarehouseId;

/// Row: stock count for one (product, warehouse) pair.
///
/// The pair is the composite key; the store keeps exactly one row per pair.
/// Quantity never goes below zero; a decrement that would is rejected whole,
/// leaving the row untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
    product_id: ProductId,
    warehouse_id: WarehouseId,
    quantity: i64,
    last_updated: DateTime<Utc>,
}

impl InventoryRow {
    /// Create the row for a first-time adjustment. A negative opening delta
    /// clamps to an empty row rather than failing; there is no stock to
    /// guard yet.
    pub fn opening(
        product_id: ProductId,
        warehouse_id: WarehouseId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            product_id,
            warehouse_id,
            quantity: delta.max(0),
            last_updated: now,
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn warehouse_id(&self) -> WarehouseId {
        self.warehouse_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Apply a signed delta, failing with `InsufficientStock` when the result
    /// would go negative. On failure the row is unchanged.
    pub fn apply_delta(&mut self, delta: i64, now: DateTime<Utc>) -> StoreResult<()> {
        let next = self.quantity.checked_add(delta).ok_or_else(|| {
            StoreError::constraint("stock quantity overflow")
        })?;
        if next < 0 {
            return Err(StoreError::InsufficientStock {
                on_hand: self.quantity,
                requested: delta,
            });
        }
        self.quantity = next;
        self.last_updated = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::RecordId;

    fn test_pair() -> (ProductId, WarehouseId) {
        (
            ProductId::new(RecordId::new()),
            WarehouseId::new(RecordId::new()),
        )
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn opening_row_clamps_negative_delta_to_zero() {
        let (product_id, warehouse_id) = test_pair();
        let row = InventoryRow::opening(product_id, warehouse_id, -30, test_time());
        assert_eq!(row.quantity(), 0);

        let row = InventoryRow::opening(product_id, warehouse_id, 50, test_time());
        assert_eq!(row.quantity(), 50);
    }

    #[test]
    fn apply_delta_accumulates() {
        let (product_id, warehouse_id) = test_pair();
        let mut row = InventoryRow::opening(product_id, warehouse_id, 50, test_time());
        row.apply_delta(-30, test_time()).unwrap();
        assert_eq!(row.quantity(), 20);
        row.apply_delta(5, test_time()).unwrap();
        assert_eq!(row.quantity(), 25);
    }

    #[test]
    fn apply_delta_rejects_overdraw_and_leaves_row_unchanged() {
        let (product_id, warehouse_id) = test_pair();
        let before = test_time();
        let mut row = InventoryRow::opening(product_id, warehouse_id, 20, before);
        let err = row.apply_delta(-30, test_time()).unwrap_err();
        match err {
            StoreError::InsufficientStock { on_hand, requested } => {
                assert_eq!(on_hand, 20);
                assert_eq!(requested, -30);
            }
            _ => panic!("Expected InsufficientStock"),
        }
        assert_eq!(row.quantity(), 20);
        assert_eq!(row.last_updated(), before);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: no sequence of deltas drives the quantity negative.
            #[test]
            fn quantity_never_negative(
                opening in 0i64..=1_000,
                deltas in proptest::collection::vec(-500i64..=500, 0..64)
            ) {
                let (product_id, warehouse_id) = test_pair();
                let mut row = InventoryRow::opening(product_id, warehouse_id, opening, Utc::now());
                for delta in deltas {
                    let _ = row.apply_delta(delta, Utc::now());
                    prop_assert!(row.quantity() >= 0);
                }
            }

            /// Property: a rejected delta leaves the quantity exactly as it was.
            #[test]
            fn rejected_delta_is_a_no_op(opening in 0i64..=100, overdraw in 101i64..=10_000) {
                let (product_id, warehouse_id) = test_pair();
                let mut row = InventoryRow::opening(product_id, warehouse_id, opening, Utc::now());
                prop_assert!(row.apply_delta(-overdraw, Utc::now()).is_err());
                prop_assert_eq!(row.quantity(), opening);
            }
        }
    }
}
