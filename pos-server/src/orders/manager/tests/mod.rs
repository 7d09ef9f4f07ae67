use super::*;
use crate::test_support::{burger_fries_cola, create_test_managers, dine_in, line, takeaway};
use rust_decimal::Decimal;
use shared::models::{DiningTable, TableStatus};

// ========================================================================
// Helper: walk an order forward to a status
// ========================================================================

fn advance_to(manager: &OrdersManager, order_id: i64, target: OrderStatus) -> Order {
    let mut order = manager.get_order(order_id).unwrap();
    while order.status != target {
        let next = order.status.next().expect("target is behind current status");
        order = manager.advance_status(order_id, next).unwrap();
    }
    order
}

fn occupied_count(table: &DiningTable) -> usize {
    table.occupied_seats().count()
}

mod test_core;
mod test_flows;
