//! Table/seat occupancy
//!
//! - [`TablesManager`]: create/delete tables, assign and release seats,
//!   merge tables, split bills, release tables
//! - [`split`]: bill split arithmetic over a table's open bill

mod manager;
pub mod split;

pub use manager::{MAX_CAPACITY, TablesManager};
pub use split::TableBill;
