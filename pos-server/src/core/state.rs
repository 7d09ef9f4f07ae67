use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::{Config, Result};
use crate::events::EventBus;
use crate::orders::OrdersManager;
use crate::storage::PosStorage;
use crate::tables::TablesManager;

/// Shared server state
///
/// Cloned into every handler; all fields are cheap handles.
///
/// | Field | Type | Purpose |
/// |-------|------|---------|
/// | config | Config | settings (immutable) |
/// | orders | OrdersManager | order lifecycle and payments |
/// | tables | TablesManager | seats, merges, bill splits |
/// | events | EventBus | post-commit domain events |
/// | jwt_service | Arc<JwtService> | token validation |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub orders: OrdersManager,
    pub tables: TablesManager,
    pub events: EventBus,
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// Open the database under the work directory and build the managers
    pub fn initialize(config: &Config) -> Result<Self> {
        let db_path = config.database_path();
        if let Some(dir) = db_path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let storage = PosStorage::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Database opened");
        Ok(Self::with_storage(config, storage))
    }

    pub fn with_storage(config: &Config, storage: PosStorage) -> Self {
        let events = EventBus::new(config.event_capacity);
        Self {
            config: config.clone(),
            orders: OrdersManager::new(storage.clone(), events.clone()),
            tables: TablesManager::new(storage, events.clone()),
            events,
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
        }
    }

    pub fn db_timeout(&self) -> std::time::Duration {
        self.config.db_timeout()
    }
}
