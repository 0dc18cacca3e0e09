use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{Entity, Money, RecordId};

use crate::order::OrderId;

/// Payment identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(pub RecordId);

impl PaymentId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// How the payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    BankTransfer,
    Wallet,
    CashOnDelivery,
}

/// Settlement status reported by the payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// Row: payment against an order (N:1).
///
/// Partial/split payment is allowed: an order may carry several rows. The
/// store enforces that settled amounts never exceed the order total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    id: PaymentId,
    order_id: OrderId,
    amount: Money,
    method: PaymentMethod,
    provider_ref: Option<String>,
    status: PaymentStatus,
    paid_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        id: PaymentId,
        order_id: OrderId,
        amount: Money,
        method: PaymentMethod,
        provider_ref: Option<&str>,
        status: PaymentStatus,
        paid_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            order_id,
            amount,
            method,
            provider_ref: provider_ref.map(str::to_string),
            status,
            paid_at,
        }
    }

    pub fn id_typed(&self) -> PaymentId {
        self.id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn provider_ref(&self) -> Option<&str> {
        self.provider_ref.as_deref()
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn paid_at(&self) -> DateTime<Utc> {
        self.paid_at
    }

    /// Whether this row counts toward the order's settled amount.
    pub fn is_settled(&self) -> bool {
        self.status == PaymentStatus::Completed
    }
}

impl Entity for Payment {
    type Id = PaymentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
