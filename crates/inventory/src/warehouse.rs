use serde::{Deserialize, Serialize};

use storefront_core::{Entity, RecordId, StoreError, StoreResult};

/// Warehouse identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarehouseId(pub RecordId);

impl WarehouseId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for WarehouseId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Row: stock-holding location (1:N inventory rows).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    id: WarehouseId,
    name: String,
    city: String,
    country: String,
}

impl Warehouse {
    pub fn new(id: WarehouseId, name: &str, city: &str, country: &str) -> StoreResult<Self> {
        if name.trim().is_empty() {
            return Err(StoreError::constraint("warehouse name cannot be empty"));
        }

        Ok(Self {
            id,
            name: name.trim().to_string(),
            city: city.trim().to_string(),
            country: country.trim().to_string(),
        })
    }

    pub fn id_typed(&self) -> WarehouseId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn country(&self) -> &str {
        &self.country
    }
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
