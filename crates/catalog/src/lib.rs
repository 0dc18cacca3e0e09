//! Catalog domain module: sellable items and their taxonomy.
//!
//! Suppliers, categories (a parent-pointer tree), products, and product
//! images. Cross-row rules (SKU/slug uniqueness, the acyclic category tree,
//! the ordered-product deletion block) live in the store crate; this crate
//! holds the rows and their row-level invariants.

pub mod category;
pub mod product;
pub mod supplier;

pub use category::{Category, CategoryId};
pub use product::{ImageId, Product, ProductId, ProductImage};
pub use supplier::{Supplier, SupplierContact, SupplierId};
