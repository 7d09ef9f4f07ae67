//! TablesManager - table and seat occupancy
//!
//! Each operation is one write transaction: load the table (and whatever
//! orders it needs), check, mutate, recompute the table status, store,
//! commit, broadcast. A rejected operation stores nothing.

use super::split::{self, TableBill};
use crate::bridge::load_open_table;
use crate::error::{ManagerError, ManagerResult};
use crate::events::EventBus;
use crate::storage::{PosStorage, StorageError, TABLE_ID_KEY};
use redb::WriteTransaction;
use shared::models::{
    BillPortion, DiningTable, MergedTable, Order, PosEvent, Seat, SeatStatus, SplitMethod,
    TableStatus,
};
use shared::util::now_millis;

/// Largest number of seats a single table may be created with
pub const MAX_CAPACITY: u32 = 50;

#[derive(Clone)]
pub struct TablesManager {
    storage: PosStorage,
    events: EventBus,
}

impl std::fmt::Debug for TablesManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TablesManager")
            .field("storage", &"<PosStorage>")
            .field("events", &self.events)
            .finish()
    }
}

impl TablesManager {
    pub fn new(storage: PosStorage, events: EventBus) -> Self {
        Self { storage, events }
    }

    fn load_orders(&self, txn: &WriteTransaction, ids: &[i64]) -> ManagerResult<Vec<Order>> {
        ids.iter()
            .map(|&id| {
                self.storage
                    .get_order_txn(txn, id)?
                    .ok_or(ManagerError::OrderNotFound(id))
            })
            .collect()
    }

    fn seat_not_found(table: &DiningTable, seat_number: u32) -> ManagerError {
        ManagerError::SeatNotFound {
            table_number: table.table_number,
            seat_number,
        }
    }

    /// Store, commit and broadcast a table mutation
    fn commit_table(&self, txn: WriteTransaction, table: &DiningTable) -> ManagerResult<()> {
        self.storage.store_table(&txn, table)?;
        txn.commit().map_err(StorageError::from)?;
        self.events.publish(PosEvent::TableUpdated {
            table: table.clone(),
        });
        Ok(())
    }

    // ========== Lifecycle ==========

    /// Create a table with `capacity` available seats numbered from 1
    pub fn create_table(&self, table_number: u32, capacity: u32) -> ManagerResult<DiningTable> {
        if table_number == 0 {
            return Err(ManagerError::Validation(
                "table_number must be at least 1".into(),
            ));
        }
        if capacity == 0 || capacity > MAX_CAPACITY {
            return Err(ManagerError::Validation(format!(
                "capacity must be between 1 and {MAX_CAPACITY}, got {capacity}"
            )));
        }

        let txn = self.storage.begin_write()?;
        if self.storage.find_table_id_txn(&txn, table_number)?.is_some() {
            return Err(ManagerError::TableNumberExists(table_number));
        }
        let id = self.storage.next_id(&txn, TABLE_ID_KEY)?;
        let table = DiningTable::new(id, table_number, capacity, now_millis());
        self.storage.index_table_number(&txn, table_number, id)?;
        self.commit_table(txn, &table)?;

        tracing::info!(table_id = id, table_number, capacity, "Table created");
        Ok(table)
    }

    /// Delete a table that is idle and not involved in a merge
    pub fn delete_table(&self, table_id: i64) -> ManagerResult<()> {
        let txn = self.storage.begin_write()?;
        let table = self
            .storage
            .get_table_txn(&txn, table_id)?
            .ok_or_else(|| ManagerError::table_id_not_found(table_id))?;

        if table.status == TableStatus::Occupied || !table.active_orders.is_empty() {
            return Err(ManagerError::TableNotReleasable(format!(
                "table #{} is occupied",
                table.table_number
            )));
        }
        if table.merged_into.is_some() || !table.merged_tables.is_empty() {
            return Err(ManagerError::TableNotReleasable(format!(
                "table #{} is part of a merge",
                table.table_number
            )));
        }

        self.storage.remove_table(&txn, &table)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(table_id, table_number = table.table_number, "Table deleted");
        self.events.publish(PosEvent::TableDeleted { table_id });
        Ok(())
    }

    pub fn get_table(&self, table_id: i64) -> ManagerResult<DiningTable> {
        self.storage
            .get_table(table_id)?
            .ok_or_else(|| ManagerError::table_id_not_found(table_id))
    }

    pub fn list_tables(&self, status: Option<TableStatus>) -> ManagerResult<Vec<DiningTable>> {
        let tables = self.storage.list_tables()?;
        Ok(tables
            .into_iter()
            .filter(|t| status.is_none_or(|s| t.status == s))
            .collect())
    }

    // ========== Seats ==========

    /// Seat a customer; an occupied seat is never overwritten
    pub fn assign_seat(
        &self,
        table_id: i64,
        seat_number: u32,
        customer_name: &str,
    ) -> ManagerResult<DiningTable> {
        let customer_name = customer_name.trim();
        if customer_name.is_empty() {
            return Err(ManagerError::Validation(
                "customer_name must not be empty".into(),
            ));
        }

        let txn = self.storage.begin_write()?;
        let mut table = load_open_table(&self.storage, &txn, table_id)?;

        let table_number = table.table_number;
        let seat = table
            .seat_mut(seat_number)
            .ok_or_else(|| ManagerError::SeatNotFound {
                table_number,
                seat_number,
            })?;
        if seat.is_occupied() {
            tracing::warn!(table_id, seat_number, "Seat already occupied");
            return Err(ManagerError::SeatConflict(format!(
                "seat {seat_number} on table #{table_number} is already occupied"
            )));
        }
        seat.status = SeatStatus::Occupied;
        seat.customer_name = Some(customer_name.to_string());
        seat.order_id = None;

        table.touch(now_millis());
        self.commit_table(txn, &table)?;

        tracing::info!(table_id, seat_number, "Seat assigned");
        Ok(table)
    }

    /// Free an occupied seat
    ///
    /// Releasing an available seat is a `SeatConflict`, as is releasing a
    /// seat still held by an unsettled order: those are freed when the order
    /// settles.
    pub fn release_seat(&self, table_id: i64, seat_number: u32) -> ManagerResult<DiningTable> {
        let txn = self.storage.begin_write()?;
        let mut table = load_open_table(&self.storage, &txn, table_id)?;

        let table_number = table.table_number;
        let seat = table
            .seat(seat_number)
            .ok_or_else(|| Self::seat_not_found(&table, seat_number))?;
        if !seat.is_occupied() {
            return Err(ManagerError::SeatConflict(format!(
                "seat {seat_number} on table #{table_number} is already available"
            )));
        }
        if let Some(order_id) = seat.order_id
            && table.active_orders.contains(&order_id)
        {
            return Err(ManagerError::SeatConflict(format!(
                "seat {seat_number} on table #{table_number} is held by open order {order_id}"
            )));
        }

        if let Some(seat) = table.seat_mut(seat_number) {
            seat.vacate();
        }
        table.touch(now_millis());
        self.commit_table(txn, &table)?;

        tracing::info!(table_id, seat_number, status = ?table.status, "Seat released");
        Ok(table)
    }

    // ========== Merge ==========

    /// Absorb table `b` into table `a`
    ///
    /// `b`'s seats are appended to `a` (renumbered after `a`'s own seats)
    /// with their occupancy, and `b`'s open orders move to `a`. `b` is
    /// parked until `a` is released. Both tables must have an open order.
    pub fn merge_tables(&self, table_id_a: i64, table_id_b: i64) -> ManagerResult<DiningTable> {
        if table_id_a == table_id_b {
            return Err(ManagerError::Validation(
                "cannot merge a table into itself".into(),
            ));
        }

        let txn = self.storage.begin_write()?;
        let mut a = load_open_table(&self.storage, &txn, table_id_a)?;
        let mut b = load_open_table(&self.storage, &txn, table_id_b)?;

        if !b.merged_tables.is_empty() {
            return Err(ManagerError::Validation(format!(
                "table #{} already hosts a merge; merge into it instead",
                b.table_number
            )));
        }
        for t in [&a, &b] {
            if t.active_orders.is_empty() {
                return Err(ManagerError::Validation(format!(
                    "table #{} has no open order to merge",
                    t.table_number
                )));
            }
        }

        let occupied_before = a.occupied_seats().count() + b.occupied_seats().count();
        let offset = a.capacity;
        let now = now_millis();

        // orders follow their seats
        for mut order in self.load_orders(&txn, &b.active_orders)? {
            order.table_id = Some(a.id);
            order.table_number = Some(a.table_number);
            for seat in order.seats.iter_mut() {
                *seat += offset;
            }
            for line in order.lines.iter_mut() {
                if let Some(seat) = line.seat_number.as_mut() {
                    *seat += offset;
                }
            }
            order.updated_at = now;
            order.version += 1;
            self.storage.store_order(&txn, &order)?;
        }

        a.seats.extend(b.seats.iter().map(|seat| Seat {
            seat_number: seat.seat_number + offset,
            ..seat.clone()
        }));
        a.capacity += b.capacity;
        a.active_orders.append(&mut b.active_orders);
        a.merged_tables.push(MergedTable {
            table_id: b.id,
            table_number: b.table_number,
            capacity: b.capacity,
        });
        a.bill_split = None;
        a.touch(now);

        b.seats = (1..=b.capacity).map(Seat::vacant).collect();
        b.merged_into = Some(a.id);
        b.bill_split = None;
        b.touch(now);

        debug_assert_eq!(a.occupied_seats().count(), occupied_before);

        self.storage.store_table(&txn, &b)?;
        self.commit_table(txn, &a)?;
        self.events.publish(PosEvent::TableUpdated { table: b.clone() });

        tracing::info!(
            table_id = a.id,
            absorbed_table_id = b.id,
            capacity = a.capacity,
            occupied_seats = occupied_before,
            "Tables merged"
        );
        Ok(a)
    }

    // ========== Billing ==========

    /// Split the table's open bill and keep the result on the table
    pub fn split_bill(&self, table_id: i64, method: &SplitMethod) -> ManagerResult<Vec<BillPortion>> {
        let txn = self.storage.begin_write()?;
        let mut table = load_open_table(&self.storage, &txn, table_id)?;

        let orders = self.load_orders(&txn, &table.active_orders)?;
        let bill = TableBill::from_orders(&orders);
        let portions = split::compute_split(&table, &bill, method)?;

        table.bill_split = Some(portions.clone());
        table.touch(now_millis());
        self.commit_table(txn, &table)?;

        tracing::info!(
            table_id,
            portions = portions.len(),
            total = %bill.total,
            "Bill split"
        );
        self.events.publish(PosEvent::BillSplit {
            table_id,
            portions: portions.clone(),
        });
        Ok(portions)
    }

    // ========== Release ==========

    /// Reset a table once every seat is free and every bound order closed
    ///
    /// Also undoes merges: the table shrinks back to its own capacity and
    /// the tables it absorbed become usable again.
    pub fn release_table(&self, table_id: i64) -> ManagerResult<DiningTable> {
        let txn = self.storage.begin_write()?;
        let mut table = load_open_table(&self.storage, &txn, table_id)?;

        if let Some(seat) = table.occupied_seats().next() {
            return Err(ManagerError::TableNotReleasable(format!(
                "seat {} on table #{} is still occupied",
                seat.seat_number, table.table_number
            )));
        }
        for order in self.load_orders(&txn, &table.active_orders)? {
            if !order.is_closed() {
                return Err(ManagerError::TableNotReleasable(format!(
                    "order {} is {} and {}",
                    order.id, order.status, order.payment_status
                )));
            }
        }

        let now = now_millis();
        let own_capacity = table.own_capacity();
        let mut unparked = Vec::new();
        for merged in std::mem::take(&mut table.merged_tables) {
            match self.storage.get_table_txn(&txn, merged.table_id)? {
                Some(mut parked) => {
                    parked.merged_into = None;
                    parked.seats = (1..=parked.capacity).map(Seat::vacant).collect();
                    parked.active_orders.clear();
                    parked.touch(now);
                    self.storage.store_table(&txn, &parked)?;
                    unparked.push(parked);
                }
                None => tracing::warn!(
                    table_id,
                    merged_table_id = merged.table_id,
                    "Merged table vanished before release"
                ),
            }
        }

        table.capacity = own_capacity;
        table.seats = (1..=own_capacity).map(Seat::vacant).collect();
        table.active_orders.clear();
        table.bill_split = None;
        table.touch(now);
        self.commit_table(txn, &table)?;
        self.events.publish_all(
            unparked
                .into_iter()
                .map(|table| PosEvent::TableUpdated { table }),
        );

        tracing::info!(table_id, table_number = table.table_number, "Table released");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::OrdersManager;
    use crate::test_support::{burger_fries_cola, create_test_managers, dine_in, line};
    use rust_decimal::Decimal;
    use shared::models::OrderStatus;

    fn serve_and_pay(orders: &OrdersManager, order_id: i64) {
        for status in [OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::Served] {
            orders.advance_status(order_id, status).unwrap();
        }
        orders.record_payment(order_id, None).unwrap();
    }

    // ========== Lifecycle ==========

    #[test]
    fn test_create_table() {
        let (_, tables) = create_test_managers();
        let table = tables.create_table(3, 4).unwrap();

        assert_eq!(table.table_number, 3);
        assert_eq!(table.capacity, 4);
        assert_eq!(table.status, TableStatus::Available);
        assert_eq!(
            table.seats.iter().map(|s| s.seat_number).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(tables.get_table(table.id).unwrap(), table);
    }

    #[test]
    fn test_create_table_validation() {
        let (_, tables) = create_test_managers();
        assert!(matches!(
            tables.create_table(0, 4),
            Err(ManagerError::Validation(_))
        ));
        assert!(matches!(
            tables.create_table(1, 0),
            Err(ManagerError::Validation(_))
        ));
        assert!(matches!(
            tables.create_table(1, MAX_CAPACITY + 1),
            Err(ManagerError::Validation(_))
        ));
        assert!(tables.create_table(1, MAX_CAPACITY).is_ok());
    }

    #[test]
    fn test_duplicate_table_number() {
        let (_, tables) = create_test_managers();
        tables.create_table(3, 4).unwrap();
        assert!(matches!(
            tables.create_table(3, 2),
            Err(ManagerError::TableNumberExists(3))
        ));
        assert_eq!(tables.list_tables(None).unwrap().len(), 1);
    }

    #[test]
    fn test_list_tables_by_status() {
        let (_, tables) = create_test_managers();
        let t7 = tables.create_table(7, 2).unwrap();
        let t2 = tables.create_table(2, 2).unwrap();
        tables.assign_seat(t7.id, 1, "Eve").unwrap();

        let all: Vec<u32> = tables
            .list_tables(None)
            .unwrap()
            .iter()
            .map(|t| t.table_number)
            .collect();
        assert_eq!(all, vec![2, 7]);

        let free = tables.list_tables(Some(TableStatus::Available)).unwrap();
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].id, t2.id);
    }

    #[test]
    fn test_delete_table() {
        let (_, tables) = create_test_managers();
        let table = tables.create_table(3, 4).unwrap();
        tables.assign_seat(table.id, 1, "Alice").unwrap();

        assert!(matches!(
            tables.delete_table(table.id),
            Err(ManagerError::TableNotReleasable(_))
        ));

        tables.release_seat(table.id, 1).unwrap();
        tables.delete_table(table.id).unwrap();
        assert!(matches!(
            tables.get_table(table.id),
            Err(ManagerError::TableNotFound(_))
        ));
        // the number is free again
        assert!(tables.create_table(3, 2).is_ok());
    }

    // ========== Seats ==========

    #[test]
    fn test_assign_and_release_seat() {
        let (_, tables) = create_test_managers();
        let table = tables.create_table(3, 4).unwrap();

        let seated = tables.assign_seat(table.id, 1, "Alice").unwrap();
        assert_eq!(seated.status, TableStatus::Occupied);
        assert_eq!(seated.seat(1).unwrap().customer_name.as_deref(), Some("Alice"));

        let released = tables.release_seat(table.id, 1).unwrap();
        assert_eq!(released.status, TableStatus::Available);
        assert_eq!(released.seat(1).unwrap().customer_name, None);
        assert!(released.version > seated.version);
    }

    #[test]
    fn test_assign_occupied_seat_conflicts() {
        let (_, tables) = create_test_managers();
        let table = tables.create_table(3, 4).unwrap();
        tables.assign_seat(table.id, 1, "Alice").unwrap();

        assert!(matches!(
            tables.assign_seat(table.id, 1, "Bob"),
            Err(ManagerError::SeatConflict(_))
        ));
        let table = tables.get_table(table.id).unwrap();
        assert_eq!(table.seat(1).unwrap().customer_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_seat_errors() {
        let (_, tables) = create_test_managers();
        let table = tables.create_table(3, 4).unwrap();

        assert!(matches!(
            tables.assign_seat(table.id, 5, "Alice"),
            Err(ManagerError::SeatNotFound { seat_number: 5, .. })
        ));
        assert!(matches!(
            tables.assign_seat(table.id, 1, "  "),
            Err(ManagerError::Validation(_))
        ));
        assert!(matches!(
            tables.assign_seat(99, 1, "Alice"),
            Err(ManagerError::TableNotFound(_))
        ));
        assert!(matches!(
            tables.release_seat(table.id, 2),
            Err(ManagerError::SeatConflict(_))
        ));
    }

    #[test]
    fn test_release_seat_held_by_open_order() {
        let (orders, tables) = create_test_managers();
        let table = tables.create_table(3, 4).unwrap();
        let mut input = dine_in(3, "Alice", burger_fries_cola());
        input.seats = vec![2];
        orders.create_order(input).unwrap();

        assert!(matches!(
            tables.release_seat(table.id, 2),
            Err(ManagerError::SeatConflict(_))
        ));
        assert!(tables.get_table(table.id).unwrap().seat(2).unwrap().is_occupied());
    }

    // ========== Merge ==========

    #[test]
    fn test_merge_keeps_occupancy_and_renumbers() {
        let (orders, tables) = create_test_managers();
        let a = tables.create_table(3, 4).unwrap();
        let b = tables.create_table(4, 2).unwrap();

        let mut first = dine_in(3, "Alice", burger_fries_cola());
        first.seats = vec![1];
        let first = orders.create_order(first).unwrap();

        let mut lines = vec![line("Steak", 2450, "main")];
        lines[0].seat_number = Some(2);
        let mut second = dine_in(4, "Bob", lines);
        second.seats = vec![2];
        let second = orders.create_order(second).unwrap();

        let merged = tables.merge_tables(a.id, b.id).unwrap();
        assert_eq!(merged.capacity, 6);
        assert_eq!(merged.seats.len(), 6);
        assert_eq!(merged.occupied_seats().count(), 2);
        assert_eq!(merged.seat(6).unwrap().order_id, Some(second.id));
        assert_eq!(merged.active_orders, vec![first.id, second.id]);
        assert_eq!(merged.merged_tables.len(), 1);
        assert_eq!(merged.status, TableStatus::Occupied);

        let moved = orders.get_order(second.id).unwrap();
        assert_eq!(moved.table_id, Some(a.id));
        assert_eq!(moved.table_number, Some(3));
        assert_eq!(moved.seats, vec![6]);
        assert_eq!(moved.lines[0].seat_number, Some(6));

        let parked = tables.get_table(b.id).unwrap();
        assert_eq!(parked.merged_into, Some(a.id));
        assert_eq!(parked.status, TableStatus::Available);
        assert!(matches!(
            tables.assign_seat(b.id, 1, "Walk-in"),
            Err(ManagerError::Validation(_))
        ));
    }

    #[test]
    fn test_merge_needs_open_orders() {
        let (orders, tables) = create_test_managers();
        let a = tables.create_table(3, 4).unwrap();
        let b = tables.create_table(4, 2).unwrap();
        orders
            .create_order(dine_in(3, "Alice", burger_fries_cola()))
            .unwrap();

        assert!(matches!(
            tables.merge_tables(a.id, b.id),
            Err(ManagerError::Validation(_))
        ));
        assert!(matches!(
            tables.merge_tables(a.id, a.id),
            Err(ManagerError::Validation(_))
        ));
        assert!(matches!(
            tables.merge_tables(a.id, 99),
            Err(ManagerError::TableNotFound(_))
        ));
        assert_eq!(tables.get_table(a.id).unwrap().capacity, 4);
    }

    // ========== Billing ==========

    #[test]
    fn test_split_bill_is_stored() {
        let (orders, tables) = create_test_managers();
        let table = tables.create_table(3, 4).unwrap();
        orders
            .create_order(dine_in(3, "Alice", burger_fries_cola()))
            .unwrap();

        let portions = tables
            .split_bill(table.id, &SplitMethod::Even { ways: 3 })
            .unwrap();
        assert_eq!(portions.len(), 3);
        assert!(portions.iter().all(|p| p.amount == Decimal::new(699, 2)));

        let stored = tables.get_table(table.id).unwrap();
        assert_eq!(stored.bill_split, Some(portions));
    }

    #[test]
    fn test_split_mismatch_stores_nothing() {
        let (orders, tables) = create_test_managers();
        let table = tables.create_table(3, 4).unwrap();
        orders
            .create_order(dine_in(3, "Alice", burger_fries_cola()))
            .unwrap();

        let method = SplitMethod::ByItem {
            splits: vec![vec![0], vec![1]],
        };
        assert!(matches!(
            tables.split_bill(table.id, &method),
            Err(ManagerError::SplitMismatch(_))
        ));
        assert_eq!(tables.get_table(table.id).unwrap().bill_split, None);
    }

    #[test]
    fn test_split_empty_table() {
        let (_, tables) = create_test_managers();
        let table = tables.create_table(3, 4).unwrap();
        assert!(matches!(
            tables.split_bill(table.id, &SplitMethod::Even { ways: 2 }),
            Err(ManagerError::Validation(_))
        ));
    }

    // ========== Release ==========

    #[test]
    fn test_release_table_with_open_order_fails() {
        let (orders, tables) = create_test_managers();
        let table = tables.create_table(3, 4).unwrap();
        let order = orders
            .create_order(dine_in(3, "Alice", burger_fries_cola()))
            .unwrap();

        assert!(matches!(
            tables.release_table(table.id),
            Err(ManagerError::TableNotReleasable(_))
        ));

        serve_and_pay(&orders, order.id);
        let released = tables.release_table(table.id).unwrap();
        assert_eq!(released.status, TableStatus::Available);
        assert!(released.active_orders.is_empty());
    }

    #[test]
    fn test_release_table_with_walk_in_fails() {
        let (_, tables) = create_test_managers();
        let table = tables.create_table(3, 4).unwrap();
        tables.assign_seat(table.id, 4, "Walk-in").unwrap();

        assert!(matches!(
            tables.release_table(table.id),
            Err(ManagerError::TableNotReleasable(_))
        ));
        assert!(tables.get_table(table.id).unwrap().seat(4).unwrap().is_occupied());
    }

    #[test]
    fn test_release_undoes_merge() {
        let (orders, tables) = create_test_managers();
        let a = tables.create_table(3, 4).unwrap();
        let b = tables.create_table(4, 2).unwrap();
        let first = orders
            .create_order(dine_in(3, "Alice", burger_fries_cola()))
            .unwrap();
        let second = orders
            .create_order(dine_in(4, "Bob", burger_fries_cola()))
            .unwrap();
        tables.merge_tables(a.id, b.id).unwrap();
        tables
            .split_bill(a.id, &SplitMethod::Even { ways: 2 })
            .unwrap();

        serve_and_pay(&orders, first.id);
        serve_and_pay(&orders, second.id);

        let released = tables.release_table(a.id).unwrap();
        assert_eq!(released.capacity, 4);
        assert_eq!(released.seats.len(), 4);
        assert!(released.merged_tables.is_empty());
        assert_eq!(released.bill_split, None);

        let b = tables.get_table(b.id).unwrap();
        assert_eq!(b.merged_into, None);
        assert_eq!(b.status, TableStatus::Available);
        assert!(tables.assign_seat(b.id, 1, "Walk-in").is_ok());
    }
}
