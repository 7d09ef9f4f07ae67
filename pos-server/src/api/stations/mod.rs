//! Kitchen and bar station API
//!
//! Queues are projections of the canonical orders; status changes made here
//! are the same change as `PUT /api/orders/{id}/status`.

use axum::{
    Json, Router,
    extract::State,
    middleware,
    routing::{get, put},
};
use shared::error::AppResult;
use shared::models::{Audience, Order, OrderView, StatusUpdate};

use crate::api::extract::{ApiJson, ApiPath};
use crate::api::orders::handler::advance;
use crate::auth::permissions::{ORDERS_READ, ORDERS_STATUS};
use crate::auth::{CurrentUser, require_permission};
use crate::core::ServerState;
use crate::utils::run_blocking;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/kitchen/orders", station_routes(Audience::Kitchen))
        .nest("/api/bar/orders", station_routes(Audience::Bar))
}

fn station_routes(audience: Audience) -> Router<ServerState> {
    let read_routes = Router::new()
        .route(
            "/",
            get(move |State(state): State<ServerState>| queue(state, audience)),
        )
        .layer(middleware::from_fn(require_permission(ORDERS_READ)));

    let status_routes = Router::new()
        .route("/{id}/status", put(update_status))
        .layer(middleware::from_fn(require_permission(ORDERS_STATUS)));

    read_routes.merge(status_routes)
}

/// GET /api/{kitchen|bar}/orders - unserved orders for the station
async fn queue(state: ServerState, audience: Audience) -> AppResult<Json<Vec<OrderView>>> {
    let orders = state.orders.clone();
    let queue = run_blocking(state.db_timeout(), "station_queue", move || {
        orders.station_queue(audience)
    })
    .await?;
    Ok(Json(queue))
}

/// PUT /api/{kitchen|bar}/orders/{id}/status
async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<StatusUpdate>,
) -> AppResult<Json<Order>> {
    advance(&state, &user, id, payload.status).await.map(Json)
}
