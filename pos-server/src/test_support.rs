//! Builders shared by the unit tests of both managers

use crate::events::EventBus;
use crate::orders::OrdersManager;
use crate::storage::PosStorage;
use crate::tables::TablesManager;
use rust_decimal::Decimal;
use shared::models::{OrderCreate, OrderLine, OrderType, PaymentType};

pub fn create_test_managers() -> (OrdersManager, TablesManager) {
    let storage = PosStorage::open_in_memory().unwrap();
    let events = EventBus::default();
    (
        OrdersManager::new(storage.clone(), events.clone()),
        TablesManager::new(storage, events),
    )
}

pub fn line(name: &str, cents: i64, category: &str) -> OrderLine {
    OrderLine {
        name: name.to_string(),
        unit_price: Decimal::new(cents, 2),
        quantity: 1,
        category: category.to_string(),
        modifiers: vec![],
        seat_number: None,
    }
}

/// Burger 12.99 + Fries 4.99 + Cola 2.99 = 20.97
pub fn burger_fries_cola() -> Vec<OrderLine> {
    vec![
        line("Burger", 1299, "main"),
        line("Fries", 499, "side"),
        line("Cola", 299, "drinks"),
    ]
}

pub fn dine_in(table_number: u32, customer_name: &str, lines: Vec<OrderLine>) -> OrderCreate {
    OrderCreate {
        lines,
        order_type: OrderType::DineIn,
        table_number: Some(table_number),
        customer_name: Some(customer_name.to_string()),
        payment_type: Some(PaymentType::Card),
        ..Default::default()
    }
}

pub fn takeaway(lines: Vec<OrderLine>) -> OrderCreate {
    OrderCreate {
        lines,
        order_type: OrderType::Takeaway,
        payment_type: Some(PaymentType::Cash),
        ..Default::default()
    }
}
