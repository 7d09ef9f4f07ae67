//! Utilities
//!
//! - [`logger`] - tracing subscriber setup
//! - [`blocking`] - running storage work off the async runtime

pub mod blocking;
pub mod logger;

pub use blocking::run_blocking;
