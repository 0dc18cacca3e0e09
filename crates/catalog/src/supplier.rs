use serde::{Deserialize, Serialize};

use storefront_core::{Entity, RecordId, StoreError, StoreResult};

/// Supplier identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplierId(pub RecordId);

impl SupplierId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for SupplierId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Contact information for a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SupplierContact {
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Row: supplier of catalog products (1:N).
///
/// Products reference suppliers without depending on them for existence;
/// deleting a supplier nulls the reference on its products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    id: SupplierId,
    name: String,
    contact: SupplierContact,
}

impl Supplier {
    pub fn new(id: SupplierId, name: &str, contact: SupplierContact) -> StoreResult<Self> {
        if name.trim().is_empty() {
            return Err(StoreError::constraint("supplier name cannot be empty"));
        }

        Ok(Self {
            id,
            name: name.trim().to_string(),
            contact,
        })
    }

    pub fn id_typed(&self) -> SupplierId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &SupplierContact {
        &self.contact
    }
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
