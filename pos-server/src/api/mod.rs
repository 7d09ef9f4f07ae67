//! HTTP API
//!
//! - [`health`] - liveness, no authentication
//! - [`orders`] - order lifecycle and payments
//! - [`stations`] - kitchen and bar queues
//! - [`tables`] - tables, seats, merges and bill splits

pub mod extract;
pub mod health;
pub mod orders;
pub mod stations;
pub mod tables;

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

/// Route table without state
pub fn routes() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(stations::router())
        .merge(tables::router())
}

/// Full application: routes, authentication and HTTP layers
pub fn build_app(state: ServerState) -> Router {
    routes()
        // require_auth skips non-API paths such as /health
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
