//! Shared types for the restaurant POS core
//!
//! Domain models used by the server and its terminals, plus the unified
//! error codes and API response structures.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
