//! Health check
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /health | GET | none |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::time::Instant;

use crate::core::ServerState;

static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

pub fn router() -> Router<ServerState> {
    START_TIME.get_or_init(Instant::now);
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    /// Live event subscribers (display terminals)
    subscribers: usize,
}

pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: START_TIME.get_or_init(Instant::now).elapsed().as_secs(),
        subscribers: state.events.receiver_count(),
    })
}
