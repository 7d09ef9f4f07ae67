//! Dining Table API Handlers

use axum::{
    Json,
    extract::State,
};
use serde::Deserialize;
use shared::error::{ApiResponse, AppResult};
use shared::models::{
    BillPortion, DiningTable, DiningTableCreate, SeatAssign, SplitMethod, TableStatus,
};

use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::core::ServerState;
use crate::utils::run_blocking;

#[derive(Debug, Deserialize)]
pub struct TableQuery {
    pub status: Option<TableStatus>,
}

/// GET /api/tables - all tables by number, optionally by status
pub async fn list(
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<TableQuery>,
) -> AppResult<Json<Vec<DiningTable>>> {
    let tables = state.tables.clone();
    let list = run_blocking(state.db_timeout(), "list_tables", move || {
        tables.list_tables(query.status)
    })
    .await?;
    Ok(Json(list))
}

/// GET /api/tables/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<DiningTable>> {
    let tables = state.tables.clone();
    let table = run_blocking(state.db_timeout(), "get_table", move || tables.get_table(id)).await?;
    Ok(Json(table))
}

/// POST /api/tables
pub async fn create(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<DiningTableCreate>,
) -> AppResult<Json<DiningTable>> {
    let tables = state.tables.clone();
    let table = run_blocking(state.db_timeout(), "create_table", move || {
        tables.create_table(payload.table_number, payload.capacity)
    })
    .await?;
    Ok(Json(table))
}

/// DELETE /api/tables/{id}
pub async fn delete(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<()>> {
    let tables = state.tables.clone();
    run_blocking(state.db_timeout(), "delete_table", move || tables.delete_table(id)).await?;
    Ok(ApiResponse::ok())
}

/// POST /api/tables/{id}/seats/{seat}/assign
pub async fn assign_seat(
    State(state): State<ServerState>,
    ApiPath((id, seat)): ApiPath<(i64, u32)>,
    ApiJson(payload): ApiJson<SeatAssign>,
) -> AppResult<Json<DiningTable>> {
    let tables = state.tables.clone();
    let table = run_blocking(state.db_timeout(), "assign_seat", move || {
        tables.assign_seat(id, seat, &payload.customer_name)
    })
    .await?;
    Ok(Json(table))
}

/// POST /api/tables/{id}/seats/{seat}/release
pub async fn release_seat(
    State(state): State<ServerState>,
    ApiPath((id, seat)): ApiPath<(i64, u32)>,
) -> AppResult<Json<DiningTable>> {
    let tables = state.tables.clone();
    let table = run_blocking(state.db_timeout(), "release_seat", move || {
        tables.release_seat(id, seat)
    })
    .await?;
    Ok(Json(table))
}

/// POST /api/tables/{id}/merge/{other} - absorb `other` into `id`
pub async fn merge(
    State(state): State<ServerState>,
    ApiPath((id, other)): ApiPath<(i64, i64)>,
) -> AppResult<Json<DiningTable>> {
    let tables = state.tables.clone();
    let table = run_blocking(state.db_timeout(), "merge_tables", move || {
        tables.merge_tables(id, other)
    })
    .await?;
    Ok(Json(table))
}

/// POST /api/tables/{id}/split-bill
pub async fn split_bill(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(method): ApiJson<SplitMethod>,
) -> AppResult<Json<Vec<BillPortion>>> {
    let tables = state.tables.clone();
    let portions = run_blocking(state.db_timeout(), "split_bill", move || {
        tables.split_bill(id, &method)
    })
    .await?;
    Ok(Json(portions))
}

/// POST /api/tables/{id}/release
pub async fn release(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<DiningTable>> {
    let tables = state.tables.clone();
    let table = run_blocking(state.db_timeout(), "release_table", move || {
        tables.release_table(id)
    })
    .await?;
    Ok(Json(table))
}
