//! Order lifecycle
//!
//! - [`OrdersManager`]: create orders, advance status, payments, views
//! - [`lifecycle`]: allowed status and payment transitions
//! - [`money`]: decimal pricing and bill division
//! - [`views`]: kitchen/bar/general projections

pub mod lifecycle;
mod manager;
pub mod money;
pub mod views;

pub use manager::{OrderFilter, OrdersManager};
