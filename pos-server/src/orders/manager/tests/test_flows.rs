use super::*;
use tokio::sync::broadcast::error::TryRecvError;

// ========== Dine-in Scenarios ==========

#[test]
fn test_alice_at_table_three() {
    let (_, tables) = create_test_managers();
    let table = tables.create_table(3, 4).unwrap();

    let table = tables.assign_seat(table.id, 2, "Alice").unwrap();
    assert_eq!(table.status, TableStatus::Occupied);
    let seat = table.seat(2).unwrap();
    assert!(seat.is_occupied());
    assert_eq!(seat.customer_name.as_deref(), Some("Alice"));
    for n in [1, 3, 4] {
        let seat = table.seat(n).unwrap();
        assert!(!seat.is_occupied());
        assert_eq!(seat.customer_name, None);
    }

    let table = tables.release_seat(table.id, 2).unwrap();
    let seat = table.seat(2).unwrap();
    assert!(!seat.is_occupied());
    assert_eq!(seat.customer_name, None);
    assert_eq!(table.status, TableStatus::Available);
}

#[test]
fn test_order_next_to_a_walk_in() {
    let (orders, tables) = create_test_managers();
    let table = tables.create_table(3, 4).unwrap();
    tables.assign_seat(table.id, 1, "Alice").unwrap();

    let order = orders
        .create_order(dine_in(3, "Bob", burger_fries_cola()))
        .unwrap();
    assert_eq!(order.seats, vec![2]);

    let table = tables.get_table(table.id).unwrap();
    assert_eq!(occupied_count(&table), 2);
    assert_eq!(table.seat(1).unwrap().order_id, None);
    assert_eq!(table.seat(2).unwrap().customer_name.as_deref(), Some("Bob"));
}

#[test]
fn test_served_then_paid_releases_seats() {
    let (orders, tables) = create_test_managers();
    let table = tables.create_table(3, 4).unwrap();

    let mut input = dine_in(3, "Alice", burger_fries_cola());
    input.customer_count = Some(2);
    let order = orders.create_order(input).unwrap();
    assert_eq!(order.total, Decimal::new(2097, 2));

    let served = advance_to(&orders, order.id, OrderStatus::Served);
    assert!(served.settled_at.is_none());
    let still_seated = tables.get_table(table.id).unwrap();
    assert_eq!(still_seated.status, TableStatus::Occupied);
    assert_eq!(occupied_count(&still_seated), 2);

    let paid = orders.record_payment(order.id, None).unwrap();
    assert!(paid.is_closed());
    assert!(paid.settled_at.is_some());

    let table = tables.get_table(table.id).unwrap();
    assert_eq!(table.status, TableStatus::Available);
    assert_eq!(occupied_count(&table), 0);
    assert!(table.active_orders.is_empty());
    assert!(table.seats.iter().all(|s| s.order_id.is_none()));
}

#[test]
fn test_paid_then_served_releases_seats() {
    let (orders, tables) = create_test_managers();
    let table = tables.create_table(5, 2).unwrap();
    let order = orders
        .create_order(dine_in(5, "Bob", burger_fries_cola()))
        .unwrap();

    let paid = orders.record_payment(order.id, None).unwrap();
    assert!(paid.settled_at.is_none());
    assert_eq!(tables.get_table(table.id).unwrap().status, TableStatus::Occupied);

    let served = advance_to(&orders, order.id, OrderStatus::Served);
    assert!(served.settled_at.is_some());
    assert_eq!(tables.get_table(table.id).unwrap().status, TableStatus::Available);
}

#[test]
fn test_settlement_happens_once() {
    let (orders, tables) = create_test_managers();
    let table = tables.create_table(3, 4).unwrap();
    let order = orders
        .create_order(dine_in(3, "Alice", burger_fries_cola()))
        .unwrap();
    advance_to(&orders, order.id, OrderStatus::Served);
    let settled = orders.record_payment(order.id, None).unwrap();

    // the next party sits down on the freed seat
    tables.assign_seat(table.id, 1, "Carol").unwrap();

    // repeating served and refunding must not free Carol's seat
    let again = orders.mark_served(order.id).unwrap();
    assert_eq!(again.settled_at, settled.settled_at);
    let refunded = orders.refund_payment(order.id).unwrap();
    assert_eq!(refunded.settled_at, settled.settled_at);

    let table = tables.get_table(table.id).unwrap();
    assert_eq!(table.seat(1).unwrap().customer_name.as_deref(), Some("Carol"));
    assert_eq!(table.status, TableStatus::Occupied);
}

#[test]
fn test_other_orders_keep_their_seats() {
    let (orders, tables) = create_test_managers();
    let table = tables.create_table(3, 4).unwrap();

    let mut first = dine_in(3, "Alice", burger_fries_cola());
    first.seats = vec![1];
    let first = orders.create_order(first).unwrap();
    let mut second = dine_in(3, "Dan", vec![line("Steak", 2450, "main")]);
    second.seats = vec![2];
    let second = orders.create_order(second).unwrap();

    advance_to(&orders, first.id, OrderStatus::Served);
    orders.record_payment(first.id, None).unwrap();

    let table = tables.get_table(table.id).unwrap();
    assert!(!table.seat(1).unwrap().is_occupied());
    assert_eq!(table.seat(2).unwrap().order_id, Some(second.id));
    assert_eq!(table.active_orders, vec![second.id]);
    assert_eq!(table.status, TableStatus::Occupied);
}

#[test]
fn test_rejected_skip_leaves_everything_unchanged() {
    let (orders, tables) = create_test_managers();
    let table = tables.create_table(3, 4).unwrap();
    let order = orders
        .create_order(dine_in(3, "Alice", burger_fries_cola()))
        .unwrap();
    orders.record_payment(order.id, None).unwrap();
    let before_order = orders.get_order(order.id).unwrap();
    let before_table = tables.get_table(table.id).unwrap();

    let err = orders
        .advance_status(order.id, OrderStatus::Served)
        .unwrap_err();
    assert!(matches!(err, ManagerError::InvalidTransition { .. }));

    assert_eq!(orders.get_order(order.id).unwrap(), before_order);
    assert_eq!(tables.get_table(table.id).unwrap(), before_table);
    for audience in [Audience::Kitchen, Audience::Bar, Audience::General] {
        let view = orders.get_status_view(order.id, audience).unwrap();
        assert_eq!(view.status, OrderStatus::Pending);
    }
}

// ========== Events ==========

#[test]
fn test_events_follow_commits() {
    let (orders, tables) = create_test_managers();
    tables.create_table(3, 4).unwrap();
    let mut rx = orders.subscribe();

    let order = orders
        .create_order(dine_in(3, "Alice", burger_fries_cola()))
        .unwrap();
    assert!(matches!(rx.try_recv(), Ok(PosEvent::OrderCreated { order: o }) if o.id == order.id));
    assert!(matches!(rx.try_recv(), Ok(PosEvent::TableUpdated { .. })));

    // rejected change publishes nothing
    orders
        .advance_status(order.id, OrderStatus::Ready)
        .unwrap_err();
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    // no-op publishes nothing
    orders.advance_status(order.id, OrderStatus::Pending).unwrap();
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    orders
        .advance_status(order.id, OrderStatus::Preparing)
        .unwrap();
    assert!(matches!(
        rx.try_recv(),
        Ok(PosEvent::OrderStatusChanged {
            from: OrderStatus::Pending,
            to: OrderStatus::Preparing,
            version: 2,
            ..
        })
    ));
}

#[test]
fn test_settlement_events() {
    let (orders, tables) = create_test_managers();
    let table = tables.create_table(3, 4).unwrap();
    let order = orders
        .create_order(dine_in(3, "Alice", burger_fries_cola()))
        .unwrap();
    advance_to(&orders, order.id, OrderStatus::Served);

    let mut rx = orders.subscribe();
    orders.record_payment(order.id, None).unwrap();

    assert!(matches!(
        rx.try_recv(),
        Ok(PosEvent::PaymentRecorded {
            payment_status: PaymentStatus::Paid,
            ..
        })
    ));
    assert!(matches!(
        rx.try_recv(),
        Ok(PosEvent::OrderSettled { order_id, table_id }) if order_id == order.id && table_id == Some(table.id)
    ));
    assert!(matches!(
        rx.try_recv(),
        Ok(PosEvent::TableUpdated { table: t }) if t.status == TableStatus::Available
    ));
}
