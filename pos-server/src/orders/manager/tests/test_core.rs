use super::*;

// ========== Creation ==========

#[test]
fn test_create_takeaway_order() {
    let (orders, _) = create_test_managers();

    let order = orders.create_order(takeaway(burger_fries_cola())).unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.total, Decimal::new(2097, 2));
    assert_eq!(order.table_id, None);
    assert_eq!(order.version, 1);
    assert_eq!(orders.get_order(order.id).unwrap(), order);
}

#[test]
fn test_order_ids_increase() {
    let (orders, _) = create_test_managers();
    let a = orders.create_order(takeaway(burger_fries_cola())).unwrap();
    let b = orders.create_order(takeaway(burger_fries_cola())).unwrap();
    assert!(b.id > a.id);
}

#[test]
fn test_create_rejects_empty_order() {
    let (orders, _) = create_test_managers();
    let err = orders.create_order(takeaway(vec![])).unwrap_err();
    assert!(matches!(err, ManagerError::Validation(_)));
}

#[test]
fn test_create_rejects_zero_total() {
    let (orders, _) = create_test_managers();
    let err = orders
        .create_order(takeaway(vec![line("Tap water", 0, "drinks")]))
        .unwrap_err();
    assert!(matches!(err, ManagerError::Validation(_)));
}

#[test]
fn test_create_checks_claimed_total() {
    let (orders, _) = create_test_managers();

    let mut input = takeaway(burger_fries_cola());
    input.total = Some(Decimal::new(2097, 2));
    assert!(orders.create_order(input).is_ok());

    let mut input = takeaway(burger_fries_cola());
    input.total = Some(Decimal::new(1999, 2));
    let err = orders.create_order(input).unwrap_err();
    assert!(matches!(err, ManagerError::Validation(_)));
}

#[test]
fn test_order_type_fields() {
    let (orders, _) = create_test_managers();

    // dine-in without table
    let mut input = takeaway(burger_fries_cola());
    input.order_type = OrderType::DineIn;
    assert!(matches!(
        orders.create_order(input),
        Err(ManagerError::Validation(_))
    ));

    // delivery without address
    let mut input = takeaway(burger_fries_cola());
    input.order_type = OrderType::Delivery;
    assert!(matches!(
        orders.create_order(input),
        Err(ManagerError::Validation(_))
    ));

    // delivery with address
    let mut input = takeaway(burger_fries_cola());
    input.order_type = OrderType::Delivery;
    input.delivery_address = Some("12 High Street".to_string());
    assert!(orders.create_order(input).is_ok());

    // takeaway naming a table
    let mut input = takeaway(burger_fries_cola());
    input.table_number = Some(3);
    assert!(matches!(
        orders.create_order(input),
        Err(ManagerError::Validation(_))
    ));
}

#[test]
fn test_dine_in_binds_table_and_seats() {
    let (orders, tables) = create_test_managers();
    let table = tables.create_table(3, 4).unwrap();

    let mut input = dine_in(3, "Alice", burger_fries_cola());
    input.customer_count = Some(2);
    let order = orders.create_order(input).unwrap();

    assert_eq!(order.table_id, Some(table.id));
    assert_eq!(order.seats, vec![1, 2]);

    let table = tables.get_table(table.id).unwrap();
    assert_eq!(table.status, TableStatus::Occupied);
    assert_eq!(table.active_orders, vec![order.id]);
    assert_eq!(occupied_count(&table), 2);
    assert_eq!(table.seat(1).unwrap().order_id, Some(order.id));
}

#[test]
fn test_dine_in_unknown_table_stores_nothing() {
    let (orders, _) = create_test_managers();

    let err = orders
        .create_order(dine_in(42, "Alice", burger_fries_cola()))
        .unwrap_err();
    assert!(matches!(err, ManagerError::TableNotFound(_)));
    assert!(orders.list_orders(&OrderFilter::default()).unwrap().is_empty());
}

#[test]
fn test_dine_in_seat_conflict_stores_nothing() {
    let (orders, tables) = create_test_managers();
    let table = tables.create_table(3, 2).unwrap();
    tables.assign_seat(table.id, 1, "Walk-in").unwrap();

    let mut input = dine_in(3, "Alice", burger_fries_cola());
    input.seats = vec![1];
    let err = orders.create_order(input).unwrap_err();
    assert!(matches!(err, ManagerError::SeatConflict(_)));

    assert!(orders.list_orders(&OrderFilter::default()).unwrap().is_empty());
    let table = tables.get_table(table.id).unwrap();
    assert!(table.active_orders.is_empty());
    assert_eq!(table.seat(1).unwrap().customer_name.as_deref(), Some("Walk-in"));
}

#[test]
fn test_line_seat_must_belong_to_order() {
    let (orders, tables) = create_test_managers();
    tables.create_table(3, 4).unwrap();

    let mut lines = burger_fries_cola();
    lines[0].seat_number = Some(3);
    let mut input = dine_in(3, "Alice", lines);
    input.seats = vec![1, 2];
    let err = orders.create_order(input).unwrap_err();
    assert!(matches!(err, ManagerError::Validation(_)));
}

// ========== Status Lifecycle ==========

#[test]
fn test_advance_through_lifecycle() {
    let (orders, _) = create_test_managers();
    let order = orders.create_order(takeaway(burger_fries_cola())).unwrap();

    let o = orders.advance_status(order.id, OrderStatus::Preparing).unwrap();
    assert_eq!(o.status, OrderStatus::Preparing);
    assert_eq!(o.version, 2);

    let o = orders.advance_status(order.id, OrderStatus::Ready).unwrap();
    assert_eq!(o.status, OrderStatus::Ready);

    let o = orders.advance_status(order.id, OrderStatus::Served).unwrap();
    assert_eq!(o.status, OrderStatus::Served);
    assert!(o.served_at.is_some());
    assert_eq!(o.version, 4);
}

#[test]
fn test_skip_is_rejected_and_state_unchanged() {
    let (orders, _) = create_test_managers();
    let order = orders.create_order(takeaway(burger_fries_cola())).unwrap();

    let err = orders
        .advance_status(order.id, OrderStatus::Served)
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::InvalidTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Served,
            ..
        }
    ));
    assert_eq!(orders.get_order(order.id).unwrap(), order);
}

#[test]
fn test_backward_move_is_rejected() {
    let (orders, _) = create_test_managers();
    let order = orders.create_order(takeaway(burger_fries_cola())).unwrap();
    advance_to(&orders, order.id, OrderStatus::Ready);

    let err = orders
        .advance_status(order.id, OrderStatus::Preparing)
        .unwrap_err();
    assert!(matches!(err, ManagerError::InvalidTransition { .. }));
    assert_eq!(orders.get_order(order.id).unwrap().status, OrderStatus::Ready);
}

#[test]
fn test_same_status_is_a_no_op() {
    let (orders, _) = create_test_managers();
    let order = orders.create_order(takeaway(burger_fries_cola())).unwrap();
    let preparing = orders.advance_status(order.id, OrderStatus::Preparing).unwrap();

    let again = orders.advance_status(order.id, OrderStatus::Preparing).unwrap();
    assert_eq!(again, preparing);
    assert_eq!(again.version, 2);
}

#[test]
fn test_mark_served_is_idempotent() {
    let (orders, _) = create_test_managers();
    let order = orders.create_order(takeaway(burger_fries_cola())).unwrap();
    advance_to(&orders, order.id, OrderStatus::Ready);

    let served = orders.mark_served(order.id).unwrap();
    assert_eq!(served.status, OrderStatus::Served);

    let again = orders.mark_served(order.id).unwrap();
    assert_eq!(again.version, served.version);
    assert_eq!(again.served_at, served.served_at);
}

#[test]
fn test_mark_served_from_pending_is_rejected() {
    let (orders, _) = create_test_managers();
    let order = orders.create_order(takeaway(burger_fries_cola())).unwrap();
    assert!(matches!(
        orders.mark_served(order.id),
        Err(ManagerError::InvalidTransition { .. })
    ));
}

#[test]
fn test_unknown_order() {
    let (orders, _) = create_test_managers();
    assert!(matches!(
        orders.advance_status(99, OrderStatus::Preparing),
        Err(ManagerError::OrderNotFound(99))
    ));
    assert!(matches!(
        orders.get_status_view(99, Audience::Kitchen),
        Err(ManagerError::OrderNotFound(99))
    ));
}

// ========== Payment ==========

#[test]
fn test_payment_then_refund() {
    let (orders, _) = create_test_managers();
    let order = orders.create_order(takeaway(burger_fries_cola())).unwrap();

    let paid = orders.record_payment(order.id, Some(PaymentType::Qr)).unwrap();
    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    assert_eq!(paid.payment_type, Some(PaymentType::Qr));
    assert!(paid.paid_at.is_some());

    assert!(matches!(
        orders.record_payment(order.id, None),
        Err(ManagerError::InvalidPaymentTransition { .. })
    ));

    let refunded = orders.refund_payment(order.id).unwrap();
    assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
    assert!(refunded.refunded_at.is_some());

    assert!(matches!(
        orders.refund_payment(order.id),
        Err(ManagerError::InvalidPaymentTransition {
            from: PaymentStatus::Refunded,
            ..
        })
    ));
}

#[test]
fn test_refund_requires_payment() {
    let (orders, _) = create_test_managers();
    let order = orders.create_order(takeaway(burger_fries_cola())).unwrap();
    assert!(matches!(
        orders.refund_payment(order.id),
        Err(ManagerError::InvalidPaymentTransition {
            from: PaymentStatus::Pending,
            ..
        })
    ));
}

#[test]
fn test_payment_needs_a_type() {
    let (orders, _) = create_test_managers();
    let mut input = takeaway(burger_fries_cola());
    input.payment_type = None;
    let order = orders.create_order(input).unwrap();

    assert!(matches!(
        orders.record_payment(order.id, None),
        Err(ManagerError::Validation(_))
    ));
    assert!(orders.record_payment(order.id, Some(PaymentType::GiftCard)).is_ok());
}

// ========== Views ==========

#[test]
fn test_views_share_canonical_status() {
    let (orders, tables) = create_test_managers();
    tables.create_table(3, 4).unwrap();
    let order = orders
        .create_order(dine_in(3, "Alice", burger_fries_cola()))
        .unwrap();

    for status in [OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::Served] {
        orders.advance_status(order.id, status).unwrap();
        let kitchen = orders.get_status_view(order.id, Audience::Kitchen).unwrap();
        let bar = orders.get_status_view(order.id, Audience::Bar).unwrap();
        let general = orders.get_status_view(order.id, Audience::General).unwrap();
        assert_eq!(kitchen.status, status);
        assert_eq!(bar.status, status);
        assert_eq!(general.status, status);
    }

    let kitchen = orders.get_status_view(order.id, Audience::Kitchen).unwrap();
    let bar = orders.get_status_view(order.id, Audience::Bar).unwrap();
    assert_eq!(kitchen.lines.len(), 2);
    assert_eq!(bar.lines.len(), 1);
    assert_eq!(bar.lines[0].name, "Cola");
}

#[test]
fn test_station_queues() {
    let (orders, _) = create_test_managers();
    let food = orders
        .create_order(takeaway(vec![line("Burger", 1299, "main")]))
        .unwrap();
    let drinks = orders
        .create_order(takeaway(vec![line("Espresso", 250, "")]))
        .unwrap();
    let mixed = orders.create_order(takeaway(burger_fries_cola())).unwrap();

    let kitchen: Vec<i64> = orders
        .station_queue(Audience::Kitchen)
        .unwrap()
        .iter()
        .map(|v| v.order_id)
        .collect();
    assert_eq!(kitchen, vec![food.id, mixed.id]);

    let bar: Vec<i64> = orders
        .station_queue(Audience::Bar)
        .unwrap()
        .iter()
        .map(|v| v.order_id)
        .collect();
    assert_eq!(bar, vec![drinks.id, mixed.id]);

    advance_to(&orders, mixed.id, OrderStatus::Served);
    assert_eq!(orders.station_queue(Audience::Bar).unwrap().len(), 1);
}

#[test]
fn test_list_orders_filters() {
    let (orders, tables) = create_test_managers();
    let table = tables.create_table(3, 4).unwrap();
    let at_table = orders
        .create_order(dine_in(3, "Alice", burger_fries_cola()))
        .unwrap();
    let away = orders.create_order(takeaway(burger_fries_cola())).unwrap();
    orders.advance_status(away.id, OrderStatus::Preparing).unwrap();

    let by_table = orders
        .list_orders(&OrderFilter {
            table_id: Some(table.id),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_table.len(), 1);
    assert_eq!(by_table[0].id, at_table.id);

    let preparing = orders
        .list_orders(&OrderFilter {
            status: Some(OrderStatus::Preparing),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(preparing.len(), 1);
    assert_eq!(preparing[0].id, away.id);
}
