//! Derived stock view: a read-only projection joining catalog and inventory.

use storefront_core::StoreResult;

use crate::tables::Store;

/// One view row per product: `(sku, name, total_quantity)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockViewRow {
    pub sku: String,
    pub name: String,
    pub total_quantity: i64,
}

impl Store {
    /// Recompute the stock view from current table state.
    ///
    /// Outer-join semantics: every product appears, with `total_quantity = 0`
    /// when it has no inventory rows at all. Nothing is cached or
    /// materialized; each call reflects exactly the committed rows at call
    /// time. Rows come back ordered by SKU.
    pub fn stock_view(&self) -> StoreResult<Vec<StockViewRow>> {
        let tables = self.read()?;

        let mut rows: Vec<StockViewRow> = tables
            .products
            .values()
            .map(|product| {
                let total_quantity = tables
                    .inventory
                    .iter()
                    .filter(|((p, _), _)| *p == product.id_typed())
                    .map(|(_, row)| row.quantity())
                    .sum();
                StockViewRow {
                    sku: product.sku().to_string(),
                    name: product.name().to_string(),
                    total_quantity,
                }
            })
            .collect();
        rows.sort_by(|a, b| a.sku.cmp(&b.sku));
        Ok(rows)
    }
}
