//! Restaurant POS server
//!
//! Keeps orders and dining tables consistent: every terminal (waiter,
//! kitchen, bar, cashier) reads the same canonical order, and an order's
//! seats go back to the table exactly once, when it is both served and paid.
//!
//! # Module layout
//!
//! ```text
//! pos-server/src/
//! ├── core/      # config, state, server startup
//! ├── auth/      # JWT, roles, middleware
//! ├── api/       # HTTP routes and handlers
//! ├── orders/    # order lifecycle, money, station views
//! ├── tables/    # seats, merges, bill splits
//! ├── bridge.rs  # the only code that writes an order and a table together
//! ├── storage.rs # redb persistence
//! ├── events.rs  # post-commit broadcast
//! └── utils/     # logging, blocking bridge
//! ```

pub mod api;
pub mod auth;
pub mod bridge;
pub mod core;
pub mod error;
pub mod events;
pub mod orders;
pub mod storage;
pub mod tables;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use auth::{CurrentUser, JwtService, Role};
pub use crate::core::{Config, Server, ServerState};
pub use error::{ManagerError, ManagerResult};
pub use events::EventBus;
pub use orders::{OrderFilter, OrdersManager};
pub use storage::PosStorage;
pub use tables::TablesManager;

pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - accepts tracing field syntax
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env`, read the configuration and start logging
pub fn setup_environment() -> crate::core::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.log_json),
        config.log_dir.as_deref(),
    );

    if config.jwt.ephemeral {
        tracing::warn!("JWT_SECRET not set, using a generated key; tokens end with the process");
    }
    Ok(config)
}
