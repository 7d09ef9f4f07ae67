use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::core::{Result, ServerError};
use crate::events::DEFAULT_EVENT_CAPACITY;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./pos-data | database and log directory |
/// | HTTP_PORT | 9625 | HTTP API port |
/// | ENVIRONMENT | development | development, staging or production |
/// | LOG_LEVEL | info | default log filter (RUST_LOG wins) |
/// | LOG_JSON | false | JSON log lines |
/// | LOG_DIR | unset | daily rolling log files |
/// | DB_TIMEOUT_MS | 5000 | per-request storage timeout |
/// | EVENT_CAPACITY | 1024 | event channel buffer |
/// | JWT_SECRET | random outside production | token signing key |
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    pub db_timeout_ms: u64,
    pub event_capacity: usize,
    pub jwt: JwtConfig,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let jwt = JwtConfig::from_env(environment == "production")
            .map_err(|e| ServerError::Config(e.to_string()))?;

        Ok(Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./pos-data".into()),
            http_port: env_or("HTTP_PORT", 9625),
            environment,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            db_timeout_ms: env_or("DB_TIMEOUT_MS", 5000),
            event_capacity: env_or("EVENT_CAPACITY", DEFAULT_EVENT_CAPACITY),
            jwt,
        })
    }

    /// Development configuration rooted at `work_dir`, ignoring the environment
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port,
            environment: "development".into(),
            log_level: "info".into(),
            log_json: false,
            log_dir: None,
            db_timeout_ms: 5000,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            jwt: JwtConfig::ephemeral(),
        }
    }

    /// `{work_dir}/database/pos.redb`
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database").join("pos.redb")
    }

    pub fn db_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.db_timeout_ms)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let config = Config::with_overrides("/tmp/pos", 8080);
        assert_eq!(config.http_port, 8080);
        assert!(!config.is_production());
        assert!(config.jwt.ephemeral);
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/pos/database/pos.redb")
        );
        assert_eq!(config.db_timeout(), std::time::Duration::from_secs(5));
    }
}
