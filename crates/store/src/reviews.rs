//! Review store operations.

use chrono::Utc;

use storefront_catalog::ProductId;
use storefront_core::{RecordId, StoreError, StoreResult};
use storefront_identity::UserId;
use storefront_reviews::{Rating, Review, ReviewId};

use crate::tables::Store;

impl Store {
    /// Add a review for a product, optionally naming the reviewer.
    pub fn add_review(
        &self,
        product_id: ProductId,
        user_id: Option<UserId>,
        rating: u8,
        title: &str,
        body: Option<&str>,
    ) -> StoreResult<Review> {
        let mut tables = self.write()?;

        let rating = Rating::new(rating)?;
        if !tables.products.contains_key(&product_id) {
            return Err(StoreError::not_found("product"));
        }
        if let Some(user_id) = user_id {
            if !tables.users.contains_key(&user_id) {
                return Err(StoreError::not_found("user"));
            }
        }

        let review = Review::new(
            ReviewId::new(RecordId::new()),
            product_id,
            user_id,
            rating,
            title,
            body,
            Utc::now(),
        )?;
        tables.reviews.insert(review.id_typed(), review.clone());
        Ok(review)
    }

    pub fn get_review(&self, review_id: ReviewId) -> StoreResult<Review> {
        let tables = self.read()?;
        tables
            .reviews
            .get(&review_id)
            .cloned()
            .ok_or(StoreError::not_found("review"))
    }

    /// Reviews of a product, newest first.
    pub fn list_reviews_for_product(&self, product_id: ProductId) -> StoreResult<Vec<Review>> {
        let tables = self.read()?;
        if !tables.products.contains_key(&product_id) {
            return Err(StoreError::not_found("product"));
        }
        let mut reviews: Vec<Review> = tables
            .reviews
            .values()
            .filter(|r| r.product_id() == product_id)
            .cloned()
            .collect();
        reviews.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
        Ok(reviews)
    }
}
