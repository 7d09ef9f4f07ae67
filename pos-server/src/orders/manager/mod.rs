//! OrdersManager - order lifecycle over the canonical order record
//!
//! # Mutation Flow
//!
//! ```text
//! advance_status(order_id, status)
//!     ├─ 1. Begin write transaction (serializes with every other writer)
//!     ├─ 2. Load canonical order
//!     ├─ 3. Plan transition (advance / unchanged / reject)
//!     ├─ 4. Apply status + timestamps, bump version
//!     ├─ 5. Settle if now served and paid (frees seats on the table)
//!     ├─ 6. Persist order (and table)
//!     ├─ 7. Commit transaction
//!     └─ 8. Broadcast event(s)
//! ```
//!
//! Any error before step 7 drops the transaction, so nothing is persisted
//! and nothing is broadcast.

use super::lifecycle::{self, Transition};
use super::{money, views};
use crate::bridge::{self, Settlement};
use crate::error::{ManagerError, ManagerResult};
use crate::events::EventBus;
use crate::storage::{ORDER_ID_KEY, PosStorage, StorageError};
use rust_decimal::Decimal;
use shared::models::{
    Audience, Order, OrderCreate, OrderLine, OrderStatus, OrderType, OrderUpdate, OrderView,
    PaymentStatus, PaymentType, PosEvent,
};
use shared::util::now_millis;

/// Filters for [`OrdersManager::list_orders`]
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub table_id: Option<i64>,
}

#[derive(Clone)]
pub struct OrdersManager {
    storage: PosStorage,
    events: EventBus,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &"<PosStorage>")
            .field("events", &self.events)
            .finish()
    }
}

fn non_blank(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Required and forbidden fields per order type
fn validate_order_fields(input: &OrderCreate) -> ManagerResult<()> {
    match input.order_type {
        OrderType::DineIn => {
            if input.table_number.is_none() {
                return Err(ManagerError::Validation(
                    "dine-in orders need a table_number".into(),
                ));
            }
            if input.delivery_address.is_some() {
                return Err(ManagerError::Validation(
                    "dine-in orders cannot carry a delivery_address".into(),
                ));
            }
        }
        OrderType::Takeaway => {
            if input.table_number.is_some() || !input.seats.is_empty() {
                return Err(ManagerError::Validation(
                    "takeaway orders cannot reference a table or seats".into(),
                ));
            }
            if input.delivery_address.is_some() {
                return Err(ManagerError::Validation(
                    "takeaway orders cannot carry a delivery_address".into(),
                ));
            }
        }
        OrderType::Delivery => {
            if !non_blank(&input.delivery_address) {
                return Err(ManagerError::Validation(
                    "delivery orders need a delivery_address".into(),
                ));
            }
            if input.table_number.is_some() || !input.seats.is_empty() {
                return Err(ManagerError::Validation(
                    "delivery orders cannot reference a table or seats".into(),
                ));
            }
        }
    }

    if input.customer_count == Some(0) {
        return Err(ManagerError::Validation(
            "customer_count must be at least 1".into(),
        ));
    }
    if input.order_type != OrderType::DineIn
        && input.lines.iter().any(|l| l.seat_number.is_some())
    {
        return Err(ManagerError::Validation(
            "only dine-in lines can name a seat".into(),
        ));
    }
    Ok(())
}

/// Validate lines and compute their total, checking a claimed total
fn price_lines(lines: &[OrderLine], claimed: Option<Decimal>) -> ManagerResult<Decimal> {
    if lines.is_empty() {
        return Err(ManagerError::Validation(
            "order must have at least one line".into(),
        ));
    }
    for (index, line) in lines.iter().enumerate() {
        money::validate_line(index, line)?;
    }

    let total = money::order_total(lines);
    if total <= Decimal::ZERO {
        return Err(ManagerError::Validation(format!(
            "order total must be positive, got {total}"
        )));
    }
    if let Some(claimed) = claimed
        && !money::money_eq(claimed, total)
    {
        return Err(ManagerError::Validation(format!(
            "claimed total {claimed} does not match computed total {total}"
        )));
    }
    Ok(total)
}

impl OrdersManager {
    pub fn new(storage: PosStorage, events: EventBus) -> Self {
        Self { storage, events }
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<PosEvent> {
        self.events.subscribe()
    }

    // ========== Creation ==========

    /// Validate, price and store a new order
    ///
    /// Dine-in orders are bound to their table and occupy seats in the same
    /// transaction; if the table or seats are unavailable nothing is stored.
    pub fn create_order(&self, input: OrderCreate) -> ManagerResult<Order> {
        let total = price_lines(&input.lines, input.total)?;
        validate_order_fields(&input)?;

        let now = now_millis();
        let txn = self.storage.begin_write()?;
        let id = self.storage.next_id(&txn, ORDER_ID_KEY)?;

        let mut order = Order {
            id,
            lines: input.lines,
            total,
            order_type: input.order_type,
            status: OrderStatus::Pending,
            table_id: None,
            table_number: input.table_number,
            seats: Vec::new(),
            customer_name: input.customer_name.filter(|n| !n.trim().is_empty()),
            customer_phone: input.customer_phone,
            delivery_address: input.delivery_address,
            special_requests: input.special_requests,
            payment_type: input.payment_type,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
            served_at: None,
            paid_at: None,
            refunded_at: None,
            settled_at: None,
            version: 1,
        };

        let table = if order.order_type == OrderType::DineIn {
            Some(bridge::bind_order(
                &self.storage,
                &txn,
                &mut order,
                &input.seats,
                input.customer_count,
                now,
            )?)
        } else {
            None
        };

        self.storage.store_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_id = order.id,
            order_type = ?order.order_type,
            table_number = ?order.table_number,
            total = %order.total,
            "Order created"
        );

        self.events.publish(PosEvent::OrderCreated {
            order: order.clone(),
        });
        if let Some(table) = table {
            self.events.publish(PosEvent::TableUpdated { table });
        }
        Ok(order)
    }

    // ========== Status Lifecycle ==========

    /// Move an order one step along pending → preparing → ready → served
    ///
    /// Requesting the current status returns the order unchanged. Reaching
    /// `served` on an already-paid order settles it and frees its seats.
    pub fn advance_status(&self, order_id: i64, new_status: OrderStatus) -> ManagerResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or(ManagerError::OrderNotFound(order_id))?;

        lifecycle::check_not_cancelled(&order)?;
        let from = order.status;
        match lifecycle::plan_transition(order_id, from, new_status) {
            Ok(Transition::Unchanged) => {
                tracing::debug!(order_id, status = %from, "Status already applied");
                return Ok(order);
            }
            Ok(Transition::Advance) => {}
            Err(e) => {
                tracing::warn!(order_id, from = %from, to = %new_status, "Rejected status change");
                return Err(e);
            }
        }

        let now = now_millis();
        order.status = new_status;
        order.updated_at = now;
        order.version += 1;
        if new_status == OrderStatus::Served {
            order.served_at = Some(now);
        }

        let settlement = bridge::settle(&self.storage, &txn, &mut order, now)?;
        self.storage.store_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, from = %from, to = %new_status, version = order.version, "Order status changed");

        self.events.publish(PosEvent::OrderStatusChanged {
            order_id,
            from,
            to: new_status,
            version: order.version,
        });
        self.publish_settlement(&order, settlement);
        Ok(order)
    }

    /// Final step of the lifecycle; idempotent once served
    pub fn mark_served(&self, order_id: i64) -> ManagerResult<Order> {
        self.advance_status(order_id, OrderStatus::Served)
    }

    // ========== Payment ==========

    /// Record payment in full (`pending → paid`)
    ///
    /// `payment_type` overrides the type chosen at creation; one of the two
    /// must be present.
    pub fn record_payment(
        &self,
        order_id: i64,
        payment_type: Option<PaymentType>,
    ) -> ManagerResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or(ManagerError::OrderNotFound(order_id))?;

        lifecycle::check_not_cancelled(&order)?;
        lifecycle::check_payment(order_id, order.payment_status)?;
        let payment_type = payment_type.or(order.payment_type).ok_or_else(|| {
            ManagerError::Validation(format!("order {order_id} has no payment_type"))
        })?;

        let now = now_millis();
        order.payment_type = Some(payment_type);
        order.payment_status = PaymentStatus::Paid;
        order.paid_at = Some(now);
        order.updated_at = now;
        order.version += 1;

        let settlement = bridge::settle(&self.storage, &txn, &mut order, now)?;
        self.storage.store_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, payment_type = ?payment_type, total = %order.total, "Payment recorded");

        self.events.publish(PosEvent::PaymentRecorded {
            order_id,
            payment_status: order.payment_status,
        });
        self.publish_settlement(&order, settlement);
        Ok(order)
    }

    /// Refund a paid order (`paid → refunded`)
    ///
    /// A refund closes the order: if it still held seats (refunded before
    /// service) they are released now. A refund never re-occupies seats that
    /// settlement already released.
    pub fn refund_payment(&self, order_id: i64) -> ManagerResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or(ManagerError::OrderNotFound(order_id))?;

        lifecycle::check_refund(order_id, order.payment_status)?;

        let now = now_millis();
        order.payment_status = PaymentStatus::Refunded;
        order.refunded_at = Some(now);
        order.updated_at = now;
        order.version += 1;

        let settlement = bridge::settle(&self.storage, &txn, &mut order, now)?;
        self.storage.store_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, status = %order.status, total = %order.total, "Payment refunded");
        self.events.publish(PosEvent::PaymentRefunded { order_id });
        self.publish_settlement(&order, settlement);
        Ok(order)
    }

    // ========== Edit / Cancel ==========

    /// Edit an order that is neither served nor paid
    ///
    /// New lines are re-priced; new seats replace the order's seats on its
    /// table in the same transaction, so a conflict leaves both untouched.
    pub fn update_order(&self, order_id: i64, update: OrderUpdate) -> ManagerResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or(ManagerError::OrderNotFound(order_id))?;

        lifecycle::check_editable(&order)?;
        if order.order_type != OrderType::DineIn {
            let seat_tagged = update
                .lines
                .as_ref()
                .is_some_and(|lines| lines.iter().any(|l| l.seat_number.is_some()));
            if update.seats.is_some() || seat_tagged {
                return Err(ManagerError::Validation(
                    "only dine-in orders have seats".into(),
                ));
            }
        }

        match update.lines {
            Some(lines) => {
                order.total = price_lines(&lines, update.total)?;
                order.lines = lines;
            }
            None if update.total.is_some() => {
                return Err(ManagerError::Validation(
                    "a claimed total needs the lines it prices".into(),
                ));
            }
            None => {}
        }
        if let Some(name) = update.customer_name {
            order.customer_name = Some(name).filter(|n| !n.trim().is_empty());
        }
        if let Some(phone) = update.customer_phone {
            order.customer_phone = Some(phone);
        }
        if let Some(requests) = update.special_requests {
            order.special_requests = Some(requests);
        }

        let now = now_millis();
        let table =
            bridge::rebind_seats(&self.storage, &txn, &mut order, update.seats.as_deref(), now)?;
        order.updated_at = now;
        order.version += 1;

        self.storage.store_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_id,
            total = %order.total,
            seats = ?order.seats,
            version = order.version,
            "Order updated"
        );

        self.events.publish(PosEvent::OrderUpdated {
            order: order.clone(),
        });
        if let Some(table) = table {
            self.events.publish(PosEvent::TableUpdated { table });
        }
        Ok(order)
    }

    /// Void an unserved order and give its seats back
    ///
    /// A paid order must be refunded first. Cancelling a cancelled order
    /// returns it unchanged.
    pub fn cancel_order(&self, order_id: i64) -> ManagerResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or(ManagerError::OrderNotFound(order_id))?;

        match lifecycle::plan_cancel(&order) {
            Ok(Transition::Unchanged) => return Ok(order),
            Ok(Transition::Advance) => {}
            Err(e) => {
                tracing::warn!(order_id, status = %order.status, payment_status = %order.payment_status, "Rejected cancellation");
                return Err(e);
            }
        }

        let from = order.status;
        let now = now_millis();
        order.status = OrderStatus::Cancelled;
        order.updated_at = now;
        order.version += 1;

        let settlement = bridge::settle(&self.storage, &txn, &mut order, now)?;
        self.storage.store_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, from = %from, "Order cancelled");
        self.events.publish(PosEvent::OrderCancelled { order_id });
        self.publish_settlement(&order, settlement);
        Ok(order)
    }

    fn publish_settlement(&self, order: &Order, settlement: Option<Settlement>) {
        if let Some(settlement) = settlement {
            self.events.publish(PosEvent::OrderSettled {
                order_id: order.id,
                table_id: order.table_id,
            });
            if let Some(table) = settlement.table {
                self.events.publish(PosEvent::TableUpdated { table });
            }
        }
    }

    // ========== Queries ==========

    pub fn get_order(&self, order_id: i64) -> ManagerResult<Order> {
        self.storage
            .get_order(order_id)?
            .ok_or(ManagerError::OrderNotFound(order_id))
    }

    pub fn list_orders(&self, filter: &OrderFilter) -> ManagerResult<Vec<Order>> {
        let orders = self.storage.list_orders()?;
        Ok(orders
            .into_iter()
            .filter(|o| filter.status.is_none_or(|s| o.status == s))
            .filter(|o| filter.table_id.is_none_or(|t| o.table_id == Some(t)))
            .collect())
    }

    /// One station's view of an order, projected from a single read
    pub fn get_status_view(&self, order_id: i64, audience: Audience) -> ManagerResult<OrderView> {
        let order = self.get_order(order_id)?;
        Ok(views::project(&order, audience))
    }

    /// Orders still in preparation with work for the station, oldest first
    pub fn station_queue(&self, audience: Audience) -> ManagerResult<Vec<OrderView>> {
        let mut orders: Vec<Order> = self
            .storage
            .list_orders()?
            .into_iter()
            .filter(|o| {
                !matches!(o.status, OrderStatus::Served | OrderStatus::Cancelled)
                    && views::has_work_for(o, audience)
            })
            .collect();
        orders.sort_by_key(|o| (o.created_at, o.id));
        Ok(orders
            .iter()
            .map(|o| views::project(o, audience))
            .collect())
    }
}

#[cfg(test)]
mod tests;
