//! Identity domain module: accounts and contact data.
//!
//! This crate contains the account-side rows (`User`, `UserProfile`,
//! `Address`) and their row-level invariants, implemented purely as
//! deterministic domain logic (no IO, no storage).

pub mod address;
pub mod profile;
pub mod user;

pub use address::{Address, AddressId};
pub use profile::UserProfile;
pub use user::{User, UserId};
