//! Status transition rules
//!
//! ```text
//! pending ──▶ preparing ──▶ ready ──▶ served
//!    │            │           │
//!    └────────────┴───────────┴──▶ cancelled
//! ```
//!
//! A request for the status the order already has is accepted as a no-op,
//! so two stations pressing "ready" at once both succeed and only one
//! change is recorded.

use crate::error::{ManagerError, ManagerResult};
use shared::models::{Order, OrderStatus, PaymentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move one step forward
    Advance,
    /// Already at the requested status
    Unchanged,
}

pub fn plan_transition(
    order_id: i64,
    current: OrderStatus,
    requested: OrderStatus,
) -> ManagerResult<Transition> {
    if current == requested {
        return Ok(Transition::Unchanged);
    }
    if current.next() == Some(requested) {
        return Ok(Transition::Advance);
    }
    Err(ManagerError::InvalidTransition {
        order_id,
        from: current,
        to: requested,
    })
}

/// Reject any change to a cancelled order
pub fn check_not_cancelled(order: &Order) -> ManagerResult<()> {
    if order.status == OrderStatus::Cancelled {
        return Err(ManagerError::OrderCancelled(order.id));
    }
    Ok(())
}

/// Cancellation: any unserved order whose money is not held
///
/// A paid order is refunded instead; cancelling twice is a no-op.
pub fn plan_cancel(order: &Order) -> ManagerResult<Transition> {
    match (order.status, order.payment_status) {
        (OrderStatus::Cancelled, _) => Ok(Transition::Unchanged),
        (OrderStatus::Served, _) => Err(ManagerError::InvalidTransition {
            order_id: order.id,
            from: OrderStatus::Served,
            to: OrderStatus::Cancelled,
        }),
        (_, PaymentStatus::Paid) => Err(ManagerError::InvalidPaymentTransition {
            order_id: order.id,
            from: PaymentStatus::Paid,
            action: "cancelled",
        }),
        _ => Ok(Transition::Advance),
    }
}

/// Lines and seats stay editable until the order is served or paid
pub fn check_editable(order: &Order) -> ManagerResult<()> {
    check_not_cancelled(order)?;
    let reason = if order.status == OrderStatus::Served {
        "already served"
    } else if order.payment_status != PaymentStatus::Pending {
        "payment already taken"
    } else {
        return Ok(());
    };
    Err(ManagerError::OrderNotEditable {
        order_id: order.id,
        reason: reason.to_string(),
    })
}

/// `pending → paid`
pub fn check_payment(order_id: i64, current: PaymentStatus) -> ManagerResult<()> {
    match current {
        PaymentStatus::Pending => Ok(()),
        from => Err(ManagerError::InvalidPaymentTransition {
            order_id,
            from,
            action: "paid",
        }),
    }
}

/// `paid → refunded`
pub fn check_refund(order_id: i64, current: PaymentStatus) -> ManagerResult<()> {
    match current {
        PaymentStatus::Paid => Ok(()),
        from => Err(ManagerError::InvalidPaymentTransition {
            order_id,
            from,
            action: "refunded",
        }),
    }
}
