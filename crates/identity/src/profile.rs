use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use storefront_core::{Entity, StoreError, StoreResult};

use crate::user::UserId;

/// Row: user profile, keyed by the owning user's id (1:1).
///
/// Exists only while the user exists; the store cascades it on user deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    user_id: UserId,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    birthdate: Option<NaiveDate>,
    bio: Option<String>,
}

impl UserProfile {
    pub fn new(
        user_id: UserId,
        first_name: &str,
        last_name: &str,
        phone: Option<&str>,
        birthdate: Option<NaiveDate>,
        bio: Option<&str>,
    ) -> StoreResult<Self> {
        if first_name.trim().is_empty() {
            return Err(StoreError::constraint("first name cannot be empty"));
        }
        if last_name.trim().is_empty() {
            return Err(StoreError::constraint("last name cannot be empty"));
        }

        Ok(Self {
            user_id,
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            phone: phone.map(str::to_string),
            birthdate,
            bio: bio.map(str::to_string),
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn birthdate(&self) -> Option<NaiveDate> {
        self.birthdate
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }
}

impl Entity for UserProfile {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.user_id
    }
}
