use serde::{Deserialize, Serialize};

use storefront_core::{Entity, RecordId, StoreError, StoreResult};

use crate::user::UserId;

/// Address identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressId(pub RecordId);

impl AddressId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for AddressId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Row: postal address owned by a user (N:1).
///
/// Orders reference addresses without owning them; when an address row is
/// deleted those references are nulled, never the other way around. At most
/// one address per user carries the primary flag; the store enforces that
/// rule, since it spans rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    id: AddressId,
    user_id: UserId,
    street: String,
    city: String,
    region: Option<String>,
    postal_code: String,
    country: String,
    primary: bool,
}

impl Address {
    pub fn new(
        id: AddressId,
        user_id: UserId,
        street: &str,
        city: &str,
        region: Option<&str>,
        postal_code: &str,
        country: &str,
    ) -> StoreResult<Self> {
        for (field, value) in [("street", street), ("city", city), ("country", country)] {
            if value.trim().is_empty() {
                return Err(StoreError::constraint(format!("{field} cannot be empty")));
            }
        }

        Ok(Self {
            id,
            user_id,
            street: street.trim().to_string(),
            city: city.trim().to_string(),
            region: region.map(str::to_string),
            postal_code: postal_code.trim().to_string(),
            country: country.trim().to_string(),
            primary: false,
        })
    }

    pub fn id_typed(&self) -> AddressId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn set_primary(&mut self, primary: bool) {
        self.primary = primary;
    }
}

impl Entity for Address {
    type Id = AddressId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
