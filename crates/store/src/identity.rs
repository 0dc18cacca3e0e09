//! Identity store operations: accounts, profiles, addresses.

use chrono::{NaiveDate, Utc};

use storefront_core::{RecordId, StoreError, StoreResult};
use storefront_identity::{user::normalize_email, Address, AddressId, User, UserId, UserProfile};

use crate::tables::Store;

impl Store {
    /// Register an account. Fails with `DuplicateKey` when the (normalized)
    /// email is already taken.
    pub fn create_user(&self, email: &str, credential_hash: &str) -> StoreResult<User> {
        let mut tables = self.write()?;

        let user = User::new(
            UserId::new(RecordId::new()),
            email,
            credential_hash,
            Utc::now(),
        )?;
        if tables.emails.contains_key(user.email()) {
            return Err(StoreError::duplicate_key("user", user.email()));
        }

        tables.emails.insert(user.email().to_string(), user.id_typed());
        tables.users.insert(user.id_typed(), user.clone());
        Ok(user)
    }

    pub fn get_user(&self, user_id: UserId) -> StoreResult<User> {
        let tables = self.read()?;
        tables
            .users
            .get(&user_id)
            .cloned()
            .ok_or(StoreError::not_found("user"))
    }

    pub fn find_user_by_email(&self, email: &str) -> StoreResult<User> {
        let tables = self.read()?;
        let email = normalize_email(email)?;
        let user_id = tables
            .emails
            .get(&email)
            .copied()
            .ok_or(StoreError::not_found("user"))?;
        tables
            .users
            .get(&user_id)
            .cloned()
            .ok_or(StoreError::not_found("user"))
    }

    pub fn set_user_active(&self, user_id: UserId, active: bool) -> StoreResult<User> {
        let mut tables = self.write()?;
        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or(StoreError::not_found("user"))?;
        user.set_active(active, Utc::now());
        Ok(user.clone())
    }

    /// Create or replace the 1:1 profile for a user.
    pub fn upsert_profile(
        &self,
        user_id: UserId,
        first_name: &str,
        last_name: &str,
        phone: Option<&str>,
        birthdate: Option<NaiveDate>,
        bio: Option<&str>,
    ) -> StoreResult<UserProfile> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::not_found("user"));
        }

        let profile = UserProfile::new(user_id, first_name, last_name, phone, birthdate, bio)?;
        tables.profiles.insert(user_id, profile.clone());
        Ok(profile)
    }

    pub fn get_profile(&self, user_id: UserId) -> StoreResult<UserProfile> {
        let tables = self.read()?;
        tables
            .profiles
            .get(&user_id)
            .cloned()
            .ok_or(StoreError::not_found("profile"))
    }

    pub fn add_address(
        &self,
        user_id: UserId,
        street: &str,
        city: &str,
        region: Option<&str>,
        postal_code: &str,
        country: &str,
    ) -> StoreResult<Address> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::not_found("user"));
        }

        let address = Address::new(
            AddressId::new(RecordId::new()),
            user_id,
            street,
            city,
            region,
            postal_code,
            country,
        )?;
        tables.addresses.insert(address.id_typed(), address.clone());
        Ok(address)
    }

    pub fn get_address(&self, address_id: AddressId) -> StoreResult<Address> {
        let tables = self.read()?;
        tables
            .addresses
            .get(&address_id)
            .cloned()
            .ok_or(StoreError::not_found("address"))
    }

    pub fn list_addresses(&self, user_id: UserId) -> StoreResult<Vec<Address>> {
        let tables = self.read()?;
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::not_found("user"));
        }
        Ok(tables
            .addresses
            .values()
            .filter(|a| a.user_id() == user_id)
            .cloned()
            .collect())
    }

    /// Make one address the user's primary, clearing the flag on every other
    /// address of that user in the same critical section, so at most one
    /// primary per user can ever be observed.
    pub fn set_primary_address(&self, user_id: UserId, address_id: AddressId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::not_found("user"));
        }
        let owner = tables
            .addresses
            .get(&address_id)
            .map(Address::user_id)
            .ok_or(StoreError::not_found("address"))?;
        if owner != user_id {
            return Err(StoreError::constraint(
                "address belongs to a different user",
            ));
        }

        for address in tables.addresses.values_mut() {
            if address.user_id() == user_id {
                address.set_primary(address.id_typed() == address_id);
            }
        }
        Ok(())
    }

    /// Delete one address row. Orders that referenced it keep their history
    /// with the reference nulled.
    pub fn delete_address(&self, address_id: AddressId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.addresses.remove(&address_id).is_none() {
            return Err(StoreError::not_found("address"));
        }

        let now = Utc::now();
        for order in tables.orders.values_mut() {
            order.clear_address(address_id, now);
        }
        Ok(())
    }

    /// Delete an account and everything it exclusively owns: profile and
    /// addresses go with it, atomically. Reviews outlive the account with the
    /// reviewer nulled. Blocked while order history references the user.
    pub fn delete_user(&self, user_id: UserId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::not_found("user"));
        }
        if tables.orders.values().any(|o| o.user_id() == user_id) {
            return Err(StoreError::referenced_by_order("user"));
        }

        let tables = &mut *tables;
        let Some(user) = tables.users.remove(&user_id) else {
            return Err(StoreError::not_found("user"));
        };
        tables.emails.remove(user.email());
        tables.profiles.remove(&user_id);

        let before = tables.addresses.len();
        tables.addresses.retain(|_, a| a.user_id() != user_id);
        let removed_addresses = before - tables.addresses.len();

        let mut cleared_reviews = 0usize;
        for review in tables.reviews.values_mut() {
            if review.user_id() == Some(user_id) {
                review.clear_user();
                cleared_reviews += 1;
            }
        }

        tracing::debug!(
            %user_id,
            removed_addresses,
            cleared_reviews,
            "user deleted with cascade"
        );
        Ok(())
    }
}
