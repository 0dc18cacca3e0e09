//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**; they represent
/// concepts where only the values matter. `Money { cents: 100 }` is a value
/// object; `Product { id: ProductId(...), .. }` is an entity.
///
/// To "modify" a value object, create a new one with the new values. This
/// keeps them safe to share across threads and lets them behave like
/// primitives (copied, compared).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
