use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_catalog::ProductId;
use storefront_core::{Entity, Money, RecordId, StoreError, StoreResult};
use storefront_identity::{AddressId, UserId};

/// Order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub RecordId);

impl OrderId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Order status lifecycle.
///
/// `pending -> paid -> shipped -> {delivered, cancelled}`, plus
/// `pending -> cancelled`. `delivered` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Payments are accepted until the order is delivered or cancelled.
    pub fn is_payable(self) -> bool {
        !matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn can_transition(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Paid)
                | (Pending, Cancelled)
                | (Paid, Shipped)
                | (Shipped, Delivered)
                | (Shipped, Cancelled)
        )
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Order line: product, quantity, snapshot unit price.
///
/// The line total is derived: `quantity × unit_price`, recomputed on every
/// read, never stored. Construction verifies the product fits in a
/// `u64` of cents, so `line_total` cannot overflow afterwards (the fields
/// are immutable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    line_no: u32,
    product_id: ProductId,
    quantity: i64,
    unit_price: Money,
}

impl OrderItem {
    pub fn new(
        line_no: u32,
        product_id: ProductId,
        quantity: i64,
        unit_price: Money,
    ) -> StoreResult<Self> {
        if quantity <= 0 {
            return Err(StoreError::InvalidQuantity(quantity));
        }
        unit_price.checked_mul(quantity as u64)?;

        Ok(Self {
            line_no,
            product_id,
            quantity,
            unit_price,
        })
    }

    pub fn line_no(&self) -> u32 {
        self.line_no
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// Derived: `quantity × unit_price`. Bounded at construction.
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price.cents() * self.quantity as u64)
    }
}

/// Row: customer order with its line items.
///
/// # Invariants
/// - At least one item (orders cannot exist empty).
/// - `total` equals the sum of the items' line totals; both are fixed at
///   creation and there is no API to change either.
/// - Status only moves along `OrderStatus::can_transition` edges.
/// - Address references are nullable; a deleted address nulls them without
///   touching the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    order_number: String,
    user_id: UserId,
    shipping_address_id: Option<AddressId>,
    billing_address_id: Option<AddressId>,
    currency: String,
    items: Vec<OrderItem>,
    total: Money,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: OrderId,
        order_number: &str,
        user_id: UserId,
        shipping_address_id: Option<AddressId>,
        billing_address_id: Option<AddressId>,
        currency: &str,
        items: Vec<OrderItem>,
        now: DateTime<Utc>,
    ) -> StoreResult<Self> {
        if items.is_empty() {
            return Err(StoreError::EmptyOrder);
        }
        if order_number.trim().is_empty() {
            return Err(StoreError::constraint("order number cannot be empty"));
        }
        validate_currency(currency)?;

        let mut total = Money::ZERO;
        for item in &items {
            total = total.checked_add(item.line_total())?;
        }

        Ok(Self {
            id,
            order_number: order_number.to_string(),
            user_id,
            shipping_address_id,
            billing_address_id,
            currency: currency.to_string(),
            items,
            total,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn order_number(&self) -> &str {
        &self.order_number
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn shipping_address_id(&self) -> Option<AddressId> {
        self.shipping_address_id
    }

    pub fn billing_address_id(&self) -> Option<AddressId> {
        self.billing_address_id
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Move the order along the lifecycle.
    pub fn transition(&mut self, next: OrderStatus, now: DateTime<Utc>) -> StoreResult<()> {
        if !self.status.can_transition(next) {
            return Err(StoreError::constraint(format!(
                "illegal order status transition: {} -> {next}",
                self.status
            )));
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Null any reference to a deleted address. The order itself is retained.
    pub fn clear_address(&mut self, address_id: AddressId, now: DateTime<Utc>) {
        let mut touched = false;
        if self.shipping_address_id == Some(address_id) {
            self.shipping_address_id = None;
            touched = true;
        }
        if self.billing_address_id == Some(address_id) {
            self.billing_address_id = None;
            touched = true;
        }
        if touched {
            self.updated_at = now;
        }
    }

    /// Whether any line cites the given product (existence protection).
    pub fn references_product(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|item| item.product_id() == product_id)
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Currencies are ISO-4217 alpha codes: exactly three ascii uppercase letters.
fn validate_currency(currency: &str) -> StoreResult<()> {
    let well_formed =
        currency.len() == 3 && currency.chars().all(|c| c.is_ascii_uppercase());
    if !well_formed {
        return Err(StoreError::constraint(format!(
            "malformed currency code: {currency:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_order_id() -> OrderId {
        OrderId::new(RecordId::new())
    }

    fn test_user_id() -> UserId {
        UserId::new(RecordId::new())
    }

    fn test_product_id() -> ProductId {
        ProductId::new(RecordId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn test_item(quantity: i64, cents: u64) -> OrderItem {
        OrderItem::new(1, test_product_id(), quantity, Money::from_cents(cents)).unwrap()
    }

    fn test_order(items: Vec<OrderItem>) -> StoreResult<Order> {
        Order::new(
            test_order_id(),
            "ORD-00000001",
            test_user_id(),
            None,
            None,
            "USD",
            items,
            test_time(),
        )
    }

    #[test]
    fn item_rejects_non_positive_quantity() {
        for quantity in [0, -1, -50] {
            let err = OrderItem::new(1, test_product_id(), quantity, Money::from_cents(100))
                .unwrap_err();
            match err {
                StoreError::InvalidQuantity(q) => assert_eq!(q, quantity),
                _ => panic!("Expected InvalidQuantity for {quantity}"),
            }
        }
    }

    #[test]
    fn line_total_is_quantity_times_unit_price() {
        let item = test_item(3, 1_250);
        assert_eq!(item.line_total(), Money::from_cents(3_750));
    }

    #[test]
    fn order_total_is_sum_of_line_totals() {
        let items = vec![
            OrderItem::new(1, test_product_id(), 1, Money::from_cents(75_000)).unwrap(),
            OrderItem::new(2, test_product_id(), 1, Money::from_cents(5_500)).unwrap(),
        ];
        let order = test_order(items).unwrap();
        assert_eq!(order.total(), Money::from_cents(80_500));
        assert_eq!(order.total().to_string(), "805.00");
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn order_rejects_empty_items() {
        let err = test_order(vec![]).unwrap_err();
        match err {
            StoreError::EmptyOrder => {}
            _ => panic!("Expected EmptyOrder"),
        }
    }

    #[test]
    fn order_rejects_malformed_currency() {
        for currency in ["", "usd", "US", "DOLLARS"] {
            let err = Order::new(
                test_order_id(),
                "ORD-00000001",
                test_user_id(),
                None,
                None,
                currency,
                vec![test_item(1, 100)],
                test_time(),
            )
            .unwrap_err();
            match err {
                StoreError::ConstraintViolation(_) => {}
                _ => panic!("Expected ConstraintViolation for currency {currency:?}"),
            }
        }
    }

    #[test]
    fn lifecycle_follows_the_happy_path() {
        let mut order = test_order(vec![test_item(1, 100)]).unwrap();
        order.transition(OrderStatus::Paid, test_time()).unwrap();
        order.transition(OrderStatus::Shipped, test_time()).unwrap();
        order.transition(OrderStatus::Delivered, test_time()).unwrap();
        assert!(order.status().is_terminal());
    }

    #[test]
    fn pending_orders_can_cancel_directly() {
        let mut order = test_order(vec![test_item(1, 100)]).unwrap();
        order.transition(OrderStatus::Cancelled, test_time()).unwrap();
        assert_eq!(order.status(), OrderStatus::Cancelled);
    }

    #[test]
    fn terminal_states_have_no_exits() {
        let mut order = test_order(vec![test_item(1, 100)]).unwrap();
        order.transition(OrderStatus::Cancelled, test_time()).unwrap();

        for next in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            let err = order.transition(next, test_time()).unwrap_err();
            match err {
                StoreError::ConstraintViolation(_) => {}
                _ => panic!("Expected ConstraintViolation leaving cancelled for {next}"),
            }
        }
    }

    #[test]
    fn skipping_states_is_rejected() {
        let mut order = test_order(vec![test_item(1, 100)]).unwrap();
        let err = order.transition(OrderStatus::Shipped, test_time()).unwrap_err();
        match err {
            StoreError::ConstraintViolation(_) => {}
            _ => panic!("Expected ConstraintViolation for pending -> shipped"),
        }
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn clear_address_nulls_matching_references_only() {
        let shipping = AddressId::new(RecordId::new());
        let billing = AddressId::new(RecordId::new());
        let mut order = Order::new(
            test_order_id(),
            "ORD-00000002",
            test_user_id(),
            Some(shipping),
            Some(billing),
            "EUR",
            vec![test_item(2, 900)],
            test_time(),
        )
        .unwrap();

        order.clear_address(shipping, test_time());
        assert_eq!(order.shipping_address_id(), None);
        assert_eq!(order.billing_address_id(), Some(billing));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn status_strategy() -> impl Strategy<Value = OrderStatus> {
            prop_oneof![
                Just(OrderStatus::Pending),
                Just(OrderStatus::Paid),
                Just(OrderStatus::Shipped),
                Just(OrderStatus::Delivered),
                Just(OrderStatus::Cancelled),
            ]
        }

        proptest! {
            /// Property: the transition relation never leaves a terminal state.
            #[test]
            fn terminal_states_are_absorbing(
                from in status_strategy(),
                to in status_strategy()
            ) {
                if from.is_terminal() {
                    prop_assert!(!from.can_transition(to));
                }
            }

            /// Property: order total always equals the recomputed item sum.
            #[test]
            fn total_matches_recomputed_sum(
                specs in proptest::collection::vec((1i64..=100, 1u64..=100_000), 1..8)
            ) {
                let items: Vec<OrderItem> = specs
                    .iter()
                    .enumerate()
                    .map(|(i, (quantity, cents))| {
                        OrderItem::new(
                            i as u32 + 1,
                            test_product_id(),
                            *quantity,
                            Money::from_cents(*cents),
                        )
                        .unwrap()
                    })
                    .collect();
                let order = test_order(items).unwrap();

                let recomputed: u64 = order
                    .items()
                    .iter()
                    .map(|item| item.line_total().cents())
                    .sum();
                prop_assert_eq!(order.total().cents(), recomputed);
            }
        }
    }
}
