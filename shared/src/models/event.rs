//! Domain events published after a successful commit

use super::dining_table::{BillPortion, DiningTable};
use super::order::{Order, OrderStatus, PaymentStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PosEvent {
    OrderCreated {
        order: Order,
    },
    OrderStatusChanged {
        order_id: i64,
        from: OrderStatus,
        to: OrderStatus,
        version: u64,
    },
    PaymentRecorded {
        order_id: i64,
        payment_status: PaymentStatus,
    },
    PaymentRefunded {
        order_id: i64,
    },
    /// Lines, seats or customer details edited before service
    OrderUpdated {
        order: Order,
    },
    OrderCancelled {
        order_id: i64,
    },
    /// Closed (served and paid, refunded or cancelled); the order's seats
    /// went back to its table
    OrderSettled {
        order_id: i64,
        table_id: Option<i64>,
    },
    TableUpdated {
        table: DiningTable,
    },
    TableDeleted {
        table_id: i64,
    },
    BillSplit {
        table_id: i64,
        portions: Vec<BillPortion>,
    },
}
