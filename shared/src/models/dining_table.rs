//! Dining Table Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    #[default]
    Available,
    Occupied,
}

/// Seat on a table, numbered from 1
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seat {
    pub seat_number: u32,
    pub status: SeatStatus,
    pub customer_name: Option<String>,
    /// Order holding the seat; `None` for walk-in assignments
    pub order_id: Option<i64>,
}

impl Seat {
    pub fn vacant(seat_number: u32) -> Self {
        Self {
            seat_number,
            status: SeatStatus::Available,
            customer_name: None,
            order_id: None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.status == SeatStatus::Occupied
    }

    pub fn vacate(&mut self) {
        self.status = SeatStatus::Available;
        self.customer_name = None;
        self.order_id = None;
    }
}

/// A table parked inside another one after a merge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergedTable {
    pub table_id: i64,
    pub table_number: u32,
    pub capacity: u32,
}

/// One payer's share of a split bill
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillPortion {
    /// 1-based position of the portion
    pub portion: u32,
    pub amount: Decimal,
    /// Indices into the table bill's line list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_indices: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seats: Vec<u32>,
}

/// How a table's bill is divided
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SplitMethod {
    /// Equal shares; leftover cents go to the first portions
    Even { ways: u32 },
    /// Each group is a list of line indices; every line exactly once
    ByItem { splits: Vec<Vec<usize>> },
    /// Each group is a list of seat numbers; seatless lines are shared evenly
    BySeat { splits: Vec<Vec<u32>> },
}

/// Dining table entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiningTable {
    pub id: i64,
    pub table_number: u32,
    /// Current capacity, grows while other tables are merged in
    pub capacity: u32,
    pub status: TableStatus,
    pub seats: Vec<Seat>,
    /// Orders bound to the table that have not settled yet
    #[serde(default)]
    pub active_orders: Vec<i64>,
    /// Tables absorbed by this one
    #[serde(default)]
    pub merged_tables: Vec<MergedTable>,
    /// Set while this table is parked inside another one
    pub merged_into: Option<i64>,
    /// Last computed bill split, cleared on release
    pub bill_split: Option<Vec<BillPortion>>,
    pub created_at: i64,
    pub updated_at: i64,
    pub version: u64,
}

impl DiningTable {
    pub fn new(id: i64, table_number: u32, capacity: u32, now: i64) -> Self {
        Self {
            id,
            table_number,
            capacity,
            status: TableStatus::Available,
            seats: (1..=capacity).map(Seat::vacant).collect(),
            active_orders: Vec::new(),
            merged_tables: Vec::new(),
            merged_into: None,
            bill_split: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn seat(&self, seat_number: u32) -> Option<&Seat> {
        self.seats.iter().find(|s| s.seat_number == seat_number)
    }

    pub fn seat_mut(&mut self, seat_number: u32) -> Option<&mut Seat> {
        self.seats.iter_mut().find(|s| s.seat_number == seat_number)
    }

    pub fn occupied_seats(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter().filter(|s| s.is_occupied())
    }

    /// Capacity the table had before any merge
    pub fn own_capacity(&self) -> u32 {
        let absorbed: u32 = self.merged_tables.iter().map(|m| m.capacity).sum();
        self.capacity.saturating_sub(absorbed)
    }

    /// Occupied iff a seat is occupied or an unsettled order is bound
    pub fn refresh_status(&mut self) {
        self.status = if self.occupied_seats().next().is_some() || !self.active_orders.is_empty()
        {
            TableStatus::Occupied
        } else {
            TableStatus::Available
        };
    }

    /// Stamp a stored mutation
    pub fn touch(&mut self, now: i64) {
        self.refresh_status();
        self.updated_at = now;
        self.version += 1;
    }
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub table_number: u32,
    pub capacity: u32,
}

/// Assign seat payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatAssign {
    pub customer_name: String,
}
