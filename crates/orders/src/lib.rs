//! Order subsystem domain module: transactional purchase records.
//!
//! Orders own their line items (created with them, destroyed with them;
//! there is no item-level deletion). Unit prices are snapshots taken from the
//! catalog at creation time, so later price changes never rewrite history,
//! and line totals are recomputed from quantity × unit price on every read.

pub mod order;
pub mod payment;

pub use order::{Order, OrderId, OrderItem, OrderStatus};
pub use payment::{Payment, PaymentId, PaymentMethod, PaymentStatus};
