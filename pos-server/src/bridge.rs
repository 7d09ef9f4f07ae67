//! Order ⇄ table consistency
//!
//! The only code that writes both an order and a dining table. Every
//! function here runs inside the caller's write transaction, so a failure
//! in either half leaves both records as they were.
//!
//! ```text
//! create dine-in order ──▶ bind_order   ──▶ seats occupied, order listed on table
//! edit seats           ──▶ rebind_seats ──▶ old seats freed, new seats occupied
//! served + paid        ─┐
//! refunded             ─┼▶ settle       ──▶ seats freed, order unlisted (once)
//! cancelled            ─┘
//! ```
//!
//! Any change to who sits at a table invalidates a stored bill split.

use crate::error::{ManagerError, ManagerResult};
use crate::storage::PosStorage;
use redb::WriteTransaction;
use shared::models::{DiningTable, Order, SeatStatus};
use std::collections::HashSet;

/// Outcome of a settlement that actually happened
#[derive(Debug, Clone)]
pub struct Settlement {
    /// The order's table after its seats were freed, if it had one
    pub table: Option<DiningTable>,
}

/// Load a table that is allowed to take part in seating operations
pub(crate) fn load_open_table(
    storage: &PosStorage,
    txn: &WriteTransaction,
    table_id: i64,
) -> ManagerResult<DiningTable> {
    let table = storage
        .get_table_txn(txn, table_id)?
        .ok_or_else(|| ManagerError::table_id_not_found(table_id))?;
    if let Some(host) = table.merged_into {
        return Err(ManagerError::Validation(format!(
            "table #{} is merged into table id {host}",
            table.table_number
        )));
    }
    Ok(table)
}

/// Choose the seats an order will occupy
fn pick_seats(
    table: &DiningTable,
    requested: &[u32],
    customer_count: Option<u32>,
) -> ManagerResult<Vec<u32>> {
    if !requested.is_empty() {
        let mut seen = HashSet::new();
        for &seat_number in requested {
            if !seen.insert(seat_number) {
                return Err(ManagerError::Validation(format!(
                    "seat {seat_number} requested more than once"
                )));
            }
            let seat = table
                .seat(seat_number)
                .ok_or(ManagerError::SeatNotFound {
                    table_number: table.table_number,
                    seat_number,
                })?;
            if seat.is_occupied() {
                return Err(ManagerError::SeatConflict(format!(
                    "seat {seat_number} on table #{} is already occupied",
                    table.table_number
                )));
            }
        }
        return Ok(requested.to_vec());
    }

    let wanted = customer_count.unwrap_or(1) as usize;
    let free: Vec<u32> = table
        .seats
        .iter()
        .filter(|s| !s.is_occupied())
        .map(|s| s.seat_number)
        .take(wanted)
        .collect();
    if free.len() < wanted {
        return Err(ManagerError::SeatConflict(format!(
            "table #{} has {} free seat(s), {wanted} needed",
            table.table_number,
            free.len()
        )));
    }
    Ok(free)
}

/// Every seat-tagged line must sit on a seat the order holds
fn check_line_seats(order: &Order, seats: &[u32]) -> ManagerResult<()> {
    for line in &order.lines {
        if let Some(seat_number) = line.seat_number
            && !seats.contains(&seat_number)
        {
            return Err(ManagerError::Validation(format!(
                "line '{}' is for seat {seat_number}, which this order does not hold",
                line.name
            )));
        }
    }
    Ok(())
}

fn occupy(table: &mut DiningTable, order: &Order, seats: &[u32]) {
    for &seat_number in seats {
        if let Some(seat) = table.seat_mut(seat_number) {
            seat.status = SeatStatus::Occupied;
            seat.customer_name = order.customer_name.clone();
            seat.order_id = Some(order.id);
        }
    }
}

/// Bind a new dine-in order to its table and occupy its seats
///
/// The order must not have been stored yet; on success `order.table_id` and
/// `order.seats` are filled in and the updated table is stored.
pub(crate) fn bind_order(
    storage: &PosStorage,
    txn: &WriteTransaction,
    order: &mut Order,
    requested_seats: &[u32],
    customer_count: Option<u32>,
    now: i64,
) -> ManagerResult<DiningTable> {
    let table_number = order
        .table_number
        .ok_or_else(|| ManagerError::Validation("dine-in orders need a table_number".into()))?;
    let table_id = storage
        .find_table_id_txn(txn, table_number)?
        .ok_or_else(|| ManagerError::table_number_not_found(table_number))?;
    let mut table = load_open_table(storage, txn, table_id)?;

    let seats = pick_seats(&table, requested_seats, customer_count)?;
    check_line_seats(order, &seats)?;

    occupy(&mut table, order, &seats);
    table.active_orders.push(order.id);
    table.bill_split = None;
    table.touch(now);
    storage.store_table(txn, &table)?;

    order.table_id = Some(table.id);
    order.seats = seats;

    tracing::debug!(
        order_id = order.id,
        table_number,
        seats = ?order.seats,
        "Order bound to table"
    );
    Ok(table)
}

/// Move an open order to a new seat set on its table, or refresh the
/// customer shown on its current seats when `requested_seats` is `None`
///
/// Lines must already be the order's final lines: their seat tags are
/// checked against the resulting seats.
pub(crate) fn rebind_seats(
    storage: &PosStorage,
    txn: &WriteTransaction,
    order: &mut Order,
    requested_seats: Option<&[u32]>,
    now: i64,
) -> ManagerResult<Option<DiningTable>> {
    let Some(table_id) = order.table_id else {
        if requested_seats.is_some() {
            return Err(ManagerError::Validation(format!(
                "order {} is not bound to a table",
                order.id
            )));
        }
        return check_line_seats(order, &[]).map(|_| None);
    };
    let mut table = load_open_table(storage, txn, table_id)?;

    let seats = match requested_seats {
        Some([]) => {
            return Err(ManagerError::Validation(
                "a dine-in order needs at least one seat".into(),
            ));
        }
        Some(requested) => {
            for seat in table.seats.iter_mut() {
                if seat.order_id == Some(order.id) {
                    seat.vacate();
                }
            }
            pick_seats(&table, requested, None)?
        }
        None => order.seats.clone(),
    };
    check_line_seats(order, &seats)?;

    occupy(&mut table, order, &seats);
    table.bill_split = None;
    table.touch(now);
    storage.store_table(txn, &table)?;

    tracing::debug!(order_id = order.id, from = ?order.seats, to = ?seats, "Order seats rebound");
    order.seats = seats;
    Ok(Some(table))
}

/// Release an order's seats the first time it closes
///
/// Returns `None` when the order is still open or was settled before;
/// `settled_at` is the guard that makes the cascade run exactly once.
pub(crate) fn settle(
    storage: &PosStorage,
    txn: &WriteTransaction,
    order: &mut Order,
    now: i64,
) -> ManagerResult<Option<Settlement>> {
    if !order.is_closed() || order.settled_at.is_some() {
        return Ok(None);
    }
    order.settled_at = Some(now);

    let Some(table_id) = order.table_id else {
        return Ok(Some(Settlement { table: None }));
    };

    let mut table = storage
        .get_table_txn(txn, table_id)?
        .ok_or_else(|| ManagerError::table_id_not_found(table_id))?;

    for seat in table.seats.iter_mut() {
        if seat.order_id == Some(order.id) {
            seat.vacate();
        }
    }
    table.active_orders.retain(|id| *id != order.id);
    table.bill_split = None;
    table.touch(now);
    storage.store_table(txn, &table)?;

    tracing::info!(
        order_id = order.id,
        table_number = table.table_number,
        table_status = ?table.status,
        status = %order.status,
        payment_status = %order.payment_status,
        "Order closed, seats released"
    );
    Ok(Some(Settlement { table: Some(table) }))
}
