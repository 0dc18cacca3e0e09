//! Store-wide error model.

use thiserror::Error;

/// Result type used across the domain and storage layers.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error raised by the data model or the store enforcing it.
///
/// Keep this focused on deterministic integrity failures (uniqueness,
/// referential integrity, bound violations, lifecycle gating). Every variant
/// is reported to the caller synchronously; nothing is swallowed or retried
/// inside the store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique constraint was violated (email, SKU, slug, order number).
    #[error("duplicate key for {entity}: {key}")]
    DuplicateKey { entity: &'static str, key: String },

    /// A reference named a row that does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// Deletion was blocked because order history references the row.
    #[error("{entity} is referenced by an order and cannot be deleted")]
    ReferencedByOrder { entity: &'static str },

    /// A stock decrement would drive the quantity negative.
    #[error("insufficient stock: {on_hand} on hand, delta {requested}")]
    InsufficientStock { on_hand: i64, requested: i64 },

    /// A quantity failed its bound (order items require quantity > 0).
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// A review rating fell outside [1, 5].
    #[error("invalid rating: {0} (must be within 1..=5)")]
    InvalidRating(u8),

    /// A monetary amount failed its bound or an aggregate limit.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A category parent chain would contain the category itself.
    #[error("cycle detected: {0}")]
    CycleDetected(String),

    /// A payment was attempted against an order in a terminal status.
    #[error("order is not payable: {0}")]
    OrderNotPayable(String),

    /// An order was created with no items.
    #[error("order has no items")]
    EmptyOrder,

    /// Generic invariant breach not covered by a dedicated variant.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A bounded lock wait was exhausted; the caller may retry.
    #[error("lock contention: {0}")]
    Contention(String),
}

impl StoreError {
    pub fn duplicate_key(entity: &'static str, key: impl Into<String>) -> Self {
        Self::DuplicateKey {
            entity,
            key: key.into(),
        }
    }

    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn referenced_by_order(entity: &'static str) -> Self {
        Self::ReferencedByOrder { entity }
    }

    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::InvalidAmount(msg.into())
    }

    pub fn cycle(msg: impl Into<String>) -> Self {
        Self::CycleDetected(msg.into())
    }

    pub fn not_payable(msg: impl Into<String>) -> Self {
        Self::OrderNotPayable(msg.into())
    }

    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::ConstraintViolation(msg.into())
    }

    pub fn contention(msg: impl Into<String>) -> Self {
        Self::Contention(msg.into())
    }

    /// Whether retrying the same operation can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Contention(_))
    }
}
