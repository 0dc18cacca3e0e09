use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_catalog::ProductId;
use storefront_core::{Entity, RecordId, StoreError, StoreResult, ValueObject};
use storefront_identity::UserId;

/// Review identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub RecordId);

impl ReviewId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ReviewId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Star rating, bounded to [1, 5] by construction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> StoreResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(StoreError::InvalidRating(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl ValueObject for Rating {}

/// Row: product review.
///
/// `user_id` is the optional, nullable side of the relationship; reviews
/// survive the reviewing account's deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    id: ReviewId,
    product_id: ProductId,
    user_id: Option<UserId>,
    rating: Rating,
    title: String,
    body: Option<String>,
    created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(
        id: ReviewId,
        product_id: ProductId,
        user_id: Option<UserId>,
        rating: Rating,
        title: &str,
        body: Option<&str>,
        now: DateTime<Utc>,
    ) -> StoreResult<Self> {
        if title.trim().is_empty() {
            return Err(StoreError::constraint("review title cannot be empty"));
        }

        Ok(Self {
            id,
            product_id,
            user_id,
            rating,
            title: title.trim().to_string(),
            body: body.map(str::to_string),
            created_at: now,
        })
    }

    pub fn id_typed(&self) -> ReviewId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Null the reviewer reference (the account was deleted).
    pub fn clear_user(&mut self) {
        self.user_id = None;
    }
}

impl Entity for Review {
    type Id = ReviewId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_review() -> Review {
        Review::new(
            ReviewId::new(RecordId::new()),
            ProductId::new(RecordId::new()),
            Some(UserId::new(RecordId::new())),
            Rating::new(4).unwrap(),
            "Solid hammer",
            Some("Balanced, good grip."),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn rating_rejects_out_of_range_values() {
        for value in [0u8, 6, 200] {
            let err = Rating::new(value).unwrap_err();
            match err {
                StoreError::InvalidRating(v) => assert_eq!(v, value),
                _ => panic!("Expected InvalidRating for {value}"),
            }
        }
    }

    #[test]
    fn rating_accepts_full_range() {
        for value in Rating::MIN..=Rating::MAX {
            assert_eq!(Rating::new(value).unwrap().value(), value);
        }
    }

    #[test]
    fn review_rejects_blank_title() {
        let err = Review::new(
            ReviewId::new(RecordId::new()),
            ProductId::new(RecordId::new()),
            None,
            Rating::new(3).unwrap(),
            "  ",
            None,
            Utc::now(),
        )
        .unwrap_err();
        match err {
            StoreError::ConstraintViolation(_) => {}
            _ => panic!("Expected ConstraintViolation for blank title"),
        }
    }

    #[test]
    fn clear_user_keeps_the_review() {
        let mut review = test_review();
        assert!(review.user_id().is_some());
        review.clear_user();
        assert_eq!(review.user_id(), None);
        assert_eq!(review.rating().value(), 4);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: construction succeeds exactly inside [1, 5].
            #[test]
            fn rating_bound_is_exact(value in 0u8..=255) {
                let result = Rating::new(value);
                if (Rating::MIN..=Rating::MAX).contains(&value) {
                    prop_assert!(result.is_ok());
                } else {
                    prop_assert!(result.is_err());
                }
            }
        }
    }
}
