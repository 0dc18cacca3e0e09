//! Storage engine: the tables, the integrity rules protecting them, and the
//! derived views over them.
//!
//! Every table lives behind one `RwLock`, so multi-row mutations (cascade
//! deletions, order creation) commit as an all-or-nothing unit and readers
//! never observe a half-applied cascade. Operations validate everything they
//! are about to touch before mutating anything; a failure therefore leaves
//! the store exactly as it was.
//!
//! Lock waits are bounded: exhaustion surfaces as a retryable
//! [`StoreError::Contention`](storefront_core::StoreError) instead of a hang.
//! The store itself never retries; the caller decides.

mod catalog;
mod identity;
mod inventory;
mod orders;
mod reviews;
mod tables;

pub mod snapshot;
pub mod stock_view;

pub use orders::OrderItemSpec;
pub use snapshot::{SnapshotError, StoreSnapshot};
pub use stock_view::StockViewRow;
pub use tables::Store;

#[cfg(test)]
mod integration_tests;
