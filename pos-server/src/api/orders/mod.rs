//! Order API
//!
//! Every route reads or changes the one canonical order record.

pub(crate) mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::permissions::{
    ORDERS_CANCEL, ORDERS_CREATE, ORDERS_READ, ORDERS_STATUS, ORDERS_UPDATE, PAYMENTS_MANAGE,
};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/view", get(handler::view))
        .layer(middleware::from_fn(require_permission(ORDERS_READ)));

    let create_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_permission(ORDERS_CREATE)));

    let edit_routes = Router::new()
        .route("/{id}", put(handler::update))
        .layer(middleware::from_fn(require_permission(ORDERS_UPDATE)));

    let cancel_routes = Router::new()
        .route("/{id}/cancel", post(handler::cancel))
        .layer(middleware::from_fn(require_permission(ORDERS_CANCEL)));

    let status_routes = Router::new()
        .route("/{id}/status", put(handler::update_status))
        .route("/{id}/mark-served", post(handler::mark_served))
        .layer(middleware::from_fn(require_permission(ORDERS_STATUS)));

    let payment_routes = Router::new()
        .route("/{id}/payment", post(handler::record_payment))
        .route("/{id}/refund", post(handler::refund))
        .layer(middleware::from_fn(require_permission(PAYMENTS_MANAGE)));

    read_routes
        .merge(create_routes)
        .merge(edit_routes)
        .merge(cancel_routes)
        .merge(status_routes)
        .merge(payment_routes)
}
