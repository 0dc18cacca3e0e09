//! Monetary amounts in the smallest currency unit.

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::value_object::ValueObject;

/// An amount of money in the smallest currency unit (e.g., cents).
///
/// Non-negativity is guaranteed by construction; arithmetic is checked so an
/// overflowing aggregate surfaces as an error instead of wrapping.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Money) -> StoreResult<Money> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| StoreError::invalid_amount("amount overflow in addition"))
    }

    /// Multiply by a row count (e.g., line quantity).
    pub fn checked_mul(self, count: u64) -> StoreResult<Money> {
        self.0
            .checked_mul(count)
            .map(Money)
            .ok_or_else(|| StoreError::invalid_amount("amount overflow in multiplication"))
    }

    /// Difference, clamped at zero. Used for read-side balances where the
    /// overpaid case has already been reported at write time.
    pub fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0))
    }
}

impl ValueObject for Money {}

impl core::fmt::Display for Money {
    /// Renders as a decimal with two fractional digits (cents convention).
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
