//! Order subsystem operations: creation with price snapshots, the status
//! lifecycle, payments, and order-level cascade deletion.

use chrono::Utc;

use storefront_catalog::ProductId;
use storefront_core::{Money, RecordId, StoreError, StoreResult};
use storefront_identity::{AddressId, UserId};
use storefront_orders::{
    Order, OrderId, OrderItem, OrderStatus, Payment, PaymentId, PaymentMethod, PaymentStatus,
};

use crate::tables::Store;

/// What the caller asks for per line. The unit price is never an input;
/// it is snapshot from the catalog at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderItemSpec {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl Store {
    /// Create an order for a user.
    ///
    /// Each item's unit price is snapshot from the product's current catalog
    /// price, so later repricing never changes this order. The total is the
    /// checked sum of the line totals, fixed here and immutable afterwards.
    /// Address references, when given, must exist and belong to the user.
    pub fn create_order(
        &self,
        user_id: UserId,
        items: &[OrderItemSpec],
        shipping_address_id: Option<AddressId>,
        billing_address_id: Option<AddressId>,
        currency: &str,
    ) -> StoreResult<Order> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::not_found("user"));
        }
        if items.is_empty() {
            return Err(StoreError::EmptyOrder);
        }
        for address_id in [shipping_address_id, billing_address_id].into_iter().flatten() {
            let address = tables
                .addresses
                .get(&address_id)
                .ok_or(StoreError::not_found("address"))?;
            if address.user_id() != user_id {
                return Err(StoreError::constraint(
                    "order address belongs to a different user",
                ));
            }
        }

        let mut lines = Vec::with_capacity(items.len());
        for (index, spec) in items.iter().enumerate() {
            let product = tables
                .products
                .get(&spec.product_id)
                .ok_or(StoreError::not_found("product"))?;
            lines.push(OrderItem::new(
                index as u32 + 1,
                spec.product_id,
                spec.quantity,
                product.price(),
            )?);
        }

        let order_number = Store::next_order_number(&mut tables);
        let order = match Order::new(
            OrderId::new(RecordId::new()),
            &order_number,
            user_id,
            shipping_address_id,
            billing_address_id,
            currency,
            lines,
            Utc::now(),
        ) {
            Ok(order) => order,
            Err(err) => {
                // Give the number back; a failed create must not leave gaps.
                tables.next_order_number -= 1;
                return Err(err);
            }
        };

        tables.order_numbers.insert(order_number, order.id_typed());
        tables.orders.insert(order.id_typed(), order.clone());
        tracing::debug!(
            order_number = order.order_number(),
            total = %order.total(),
            items = order.items().len(),
            "order created"
        );
        Ok(order)
    }

    pub fn get_order(&self, order_id: OrderId) -> StoreResult<Order> {
        let tables = self.read()?;
        tables
            .orders
            .get(&order_id)
            .cloned()
            .ok_or(StoreError::not_found("order"))
    }

    pub fn find_order_by_number(&self, order_number: &str) -> StoreResult<Order> {
        let tables = self.read()?;
        let order_id = tables
            .order_numbers
            .get(order_number)
            .copied()
            .ok_or(StoreError::not_found("order"))?;
        tables
            .orders
            .get(&order_id)
            .cloned()
            .ok_or(StoreError::not_found("order"))
    }

    /// Orders of a user, oldest first.
    pub fn list_orders_for_user(&self, user_id: UserId) -> StoreResult<Vec<Order>> {
        let tables = self.read()?;
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::not_found("user"));
        }
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| o.user_id() == user_id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.order_number().to_string());
        Ok(orders)
    }

    /// Move an order along its lifecycle; illegal edges are rejected with the
    /// order unchanged.
    pub fn transition_order(&self, order_id: OrderId, next: OrderStatus) -> StoreResult<Order> {
        let mut tables = self.write()?;
        let order = tables
            .orders
            .get_mut(&order_id)
            .ok_or(StoreError::not_found("order"))?;
        order.transition(next, Utc::now())?;
        Ok(order.clone())
    }

    /// Record a payment against an order.
    ///
    /// Split payment is allowed, but the settled sum may never exceed the
    /// order total; an excess payment is rejected (`InvalidAmount`), not
    /// clamped. Terminal orders take no payments (`OrderNotPayable`).
    pub fn add_payment(
        &self,
        order_id: OrderId,
        amount: Money,
        method: PaymentMethod,
        provider_ref: Option<&str>,
    ) -> StoreResult<Payment> {
        let mut tables = self.write()?;
        let order = tables
            .orders
            .get(&order_id)
            .ok_or(StoreError::not_found("order"))?;
        if !order.status().is_payable() {
            return Err(StoreError::not_payable(format!(
                "order {} is {}",
                order.order_number(),
                order.status()
            )));
        }

        let settled = tables.settled_cents(order_id);
        let proposed = Money::from_cents(settled).checked_add(amount)?;
        if proposed > order.total() {
            return Err(StoreError::invalid_amount(format!(
                "payments {proposed} would exceed order total {}",
                order.total()
            )));
        }

        let payment = Payment::new(
            PaymentId::new(RecordId::new()),
            order_id,
            amount,
            method,
            provider_ref,
            PaymentStatus::Completed,
            Utc::now(),
        );
        tables.payments.insert(payment.id_typed(), payment.clone());
        Ok(payment)
    }

    /// Payments recorded against an order, oldest first.
    pub fn list_payments(&self, order_id: OrderId) -> StoreResult<Vec<Payment>> {
        let tables = self.read()?;
        if !tables.orders.contains_key(&order_id) {
            return Err(StoreError::not_found("order"));
        }
        let mut payments: Vec<Payment> = tables
            .payments
            .values()
            .filter(|p| p.order_id() == order_id)
            .cloned()
            .collect();
        payments.sort_by_key(Payment::paid_at);
        Ok(payments)
    }

    /// Settled amount so far.
    pub fn amount_paid(&self, order_id: OrderId) -> StoreResult<Money> {
        let tables = self.read()?;
        if !tables.orders.contains_key(&order_id) {
            return Err(StoreError::not_found("order"));
        }
        Ok(Money::from_cents(tables.settled_cents(order_id)))
    }

    /// Total minus settled payments. The write path guarantees payments never
    /// exceed the total, so this cannot go negative.
    pub fn outstanding_balance(&self, order_id: OrderId) -> StoreResult<Money> {
        let tables = self.read()?;
        let order = tables
            .orders
            .get(&order_id)
            .ok_or(StoreError::not_found("order"))?;
        Ok(order
            .total()
            .saturating_sub(Money::from_cents(tables.settled_cents(order_id))))
    }

    /// Purge an order record. Its items die with it (they have no life of
    /// their own) and its payments are removed in the same unit.
    pub fn delete_order(&self, order_id: OrderId) -> StoreResult<()> {
        let mut tables = self.write()?;
        let tables = &mut *tables;
        let Some(order) = tables.orders.remove(&order_id) else {
            return Err(StoreError::not_found("order"));
        };
        tables.order_numbers.remove(order.order_number());

        let before = tables.payments.len();
        tables.payments.retain(|_, p| p.order_id() != order_id);
        tracing::debug!(
            order_number = order.order_number(),
            removed_payments = before - tables.payments.len(),
            "order deleted with cascade"
        );
        Ok(())
    }
}
