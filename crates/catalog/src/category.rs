use serde::{Deserialize, Serialize};

use storefront_core::{Entity, RecordId, StoreError, StoreResult};

/// Category identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub RecordId);

impl CategoryId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Row: catalog category.
///
/// Categories form a tree via `parent_id`. A simple foreign key cannot
/// express "not an ancestor of itself", so the store walks the ancestor
/// chain on insert and reparent; this row only guarantees name/slug shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    slug: String,
    parent_id: Option<CategoryId>,
}

impl Category {
    pub fn new(
        id: CategoryId,
        name: &str,
        slug: &str,
        parent_id: Option<CategoryId>,
    ) -> StoreResult<Self> {
        if name.trim().is_empty() {
            return Err(StoreError::constraint("category name cannot be empty"));
        }
        validate_slug(slug)?;

        Ok(Self {
            id,
            name: name.trim().to_string(),
            slug: slug.to_string(),
            parent_id,
        })
    }

    pub fn id_typed(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn parent_id(&self) -> Option<CategoryId> {
        self.parent_id
    }

    /// Repoint this category in the tree. Acyclicity is the store's check;
    /// this only records the edge.
    pub fn set_parent(&mut self, parent_id: Option<CategoryId>) {
        self.parent_id = parent_id;
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Slugs are lowercase kebab-case: ascii letters, digits, single dashes.
fn validate_slug(slug: &str) -> StoreResult<()> {
    let well_formed = !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !well_formed {
        return Err(StoreError::constraint(format!("malformed slug: {slug:?}")));
    }
    Ok(())
}
