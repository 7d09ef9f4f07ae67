//! Dining Table API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::permissions::{
    BILLS_SPLIT, TABLES_MANAGE, TABLES_READ, TABLES_RELEASE, TABLES_SEAT,
};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission(TABLES_READ)));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", axum::routing::delete(handler::delete))
        .layer(middleware::from_fn(require_permission(TABLES_MANAGE)));

    let seat_routes = Router::new()
        .route("/{id}/seats/{seat}/assign", post(handler::assign_seat))
        .route("/{id}/seats/{seat}/release", post(handler::release_seat))
        .route("/{id}/merge/{other}", post(handler::merge))
        .layer(middleware::from_fn(require_permission(TABLES_SEAT)));

    let bill_routes = Router::new()
        .route("/{id}/split-bill", post(handler::split_bill))
        .layer(middleware::from_fn(require_permission(BILLS_SPLIT)));

    let release_routes = Router::new()
        .route("/{id}/release", post(handler::release))
        .layer(middleware::from_fn(require_permission(TABLES_RELEASE)));

    read_routes
        .merge(manage_routes)
        .merge(seat_routes)
        .merge(bill_routes)
        .merge(release_routes)
}
