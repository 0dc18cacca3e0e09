//! Review store domain module: product feedback.
//!
//! Reviews belong to a product (destroyed with it) and optionally name the
//! reviewing user; deleting the user nulls the reference but keeps the
//! review.

pub mod review;

pub use review::{Rating, Review, ReviewId};
