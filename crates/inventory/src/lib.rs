//! Inventory ledger domain module: per-location stock counts.
//!
//! One `InventoryRow` per (product, warehouse) pair, quantity never below
//! zero. The row enforces the non-negativity bound; serialization of
//! concurrent adjustments is the store's job.

pub mod stock;
pub mod warehouse;

pub use stock::InventoryRow;
pub use warehouse::{Warehouse, WarehouseId};
