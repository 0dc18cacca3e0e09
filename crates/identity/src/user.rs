use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{Entity, RecordId, StoreError, StoreResult};

/// User account identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub RecordId);

impl UserId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Row: user account.
///
/// # Invariants
/// - `email` is normalized (trimmed, lowercased) and well-formed.
/// - `credential_hash` is opaque to this model and never empty.
/// - `updated_at` moves forward on every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: String,
    credential_hash: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: UserId,
        email: &str,
        credential_hash: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Self> {
        let email = normalize_email(email)?;
        if credential_hash.trim().is_empty() {
            return Err(StoreError::constraint("credential hash cannot be empty"));
        }

        Ok(Self {
            id,
            email,
            credential_hash: credential_hash.to_string(),
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id_typed(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn credential_hash(&self) -> &str {
        &self.credential_hash
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_active(&mut self, active: bool, now: DateTime<Utc>) {
        self.active = active;
        self.updated_at = now;
    }

    pub fn set_credential_hash(&mut self, hash: &str, now: DateTime<Utc>) -> StoreResult<()> {
        if hash.trim().is_empty() {
            return Err(StoreError::constraint("credential hash cannot be empty"));
        }
        self.credential_hash = hash.to_string();
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Normalize and validate an email address.
///
/// The model only cares about uniqueness and a minimally sane shape; full
/// RFC validation belongs to the registration workflow upstream.
pub fn normalize_email(raw: &str) -> StoreResult<String> {
    let email = raw.trim().to_ascii_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    };
    if !valid {
        return Err(StoreError::constraint(format!("malformed email: {raw:?}")));
    }
    Ok(email)
}
