//! Server configuration, state and startup
//!
//! - [`Config`] - settings loaded from the environment
//! - [`ServerState`] - shared managers handed to every handler
//! - [`Server`] - HTTP listener
//! - [`ServerError`] - startup failures

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
