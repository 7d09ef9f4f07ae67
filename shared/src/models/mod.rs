//! Data models
//!
//! Shared between the server and every terminal (via API). All record IDs
//! are `i64`; table and seat numbers are the human-facing `u32` labels.

pub mod dining_table;
pub mod event;
pub mod order;
pub mod view;

// Re-exports
pub use dining_table::*;
pub use event::*;
pub use order::*;
pub use view::*;
