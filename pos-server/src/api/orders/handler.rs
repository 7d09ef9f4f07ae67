//! Order API Handlers

use axum::{
    Json,
    extract::State,
};
use serde::Deserialize;
use shared::error::AppResult;
use shared::models::{
    Audience, Order, OrderCreate, OrderStatus, OrderUpdate, OrderView, PaymentRecord,
    StatusUpdate,
};

use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::OrderFilter;
use crate::utils::run_blocking;

#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub table_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub audience: Audience,
}

/// POST /api/orders - create an order
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<OrderCreate>,
) -> AppResult<Json<Order>> {
    let orders = state.orders.clone();
    let order = run_blocking(state.db_timeout(), "create_order", move || {
        orders.create_order(payload)
    })
    .await?;
    tracing::debug!(order_id = order.id, operator = %user.username, "Order created via API");
    Ok(Json(order))
}

/// GET /api/orders - list orders, optionally by status or table
pub async fn list(
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<OrderQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.orders.clone();
    let filter = OrderFilter {
        status: query.status,
        table_id: query.table_id,
    };
    let list = run_blocking(state.db_timeout(), "list_orders", move || {
        orders.list_orders(&filter)
    })
    .await?;
    Ok(Json(list))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<Order>> {
    let orders = state.orders.clone();
    let order = run_blocking(state.db_timeout(), "get_order", move || orders.get_order(id)).await?;
    Ok(Json(order))
}

/// GET /api/orders/{id}/view?audience=kitchen|bar|general
pub async fn view(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<ViewQuery>,
) -> AppResult<Json<OrderView>> {
    let orders = state.orders.clone();
    let view = run_blocking(state.db_timeout(), "get_status_view", move || {
        orders.get_status_view(id, query.audience)
    })
    .await?;
    Ok(Json(view))
}

/// Shared by the order, kitchen and bar status routes
pub(crate) async fn advance(
    state: &ServerState,
    user: &CurrentUser,
    id: i64,
    status: OrderStatus,
) -> AppResult<Order> {
    let orders = state.orders.clone();
    let order = run_blocking(state.db_timeout(), "advance_status", move || {
        orders.advance_status(id, status)
    })
    .await?;
    tracing::info!(
        target: "audit",
        order_id = id,
        status = %order.status,
        operator = %user.username,
        role = %user.role,
        "Status change requested"
    );
    Ok(order)
}

/// PUT /api/orders/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<StatusUpdate>,
) -> AppResult<Json<Order>> {
    advance(&state, &user, id, payload.status).await.map(Json)
}

/// POST /api/orders/{id}/mark-served
pub async fn mark_served(
    State(state): State<ServerState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<Order>> {
    advance(&state, &user, id, OrderStatus::Served).await.map(Json)
}

/// POST /api/orders/{id}/payment
pub async fn record_payment(
    State(state): State<ServerState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<PaymentRecord>,
) -> AppResult<Json<Order>> {
    let orders = state.orders.clone();
    let order = run_blocking(state.db_timeout(), "record_payment", move || {
        orders.record_payment(id, payload.payment_type)
    })
    .await?;
    tracing::info!(target: "audit", order_id = id, operator = %user.username, "Payment taken");
    Ok(Json(order))
}

/// POST /api/orders/{id}/refund
pub async fn refund(
    State(state): State<ServerState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<Order>> {
    let orders = state.orders.clone();
    let order = run_blocking(state.db_timeout(), "refund_payment", move || {
        orders.refund_payment(id)
    })
    .await?;
    tracing::info!(target: "audit", order_id = id, operator = %user.username, "Payment refunded");
    Ok(Json(order))
}

/// PUT /api/orders/{id} - edit an unserved, unpaid order
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<OrderUpdate>,
) -> AppResult<Json<Order>> {
    let orders = state.orders.clone();
    let order = run_blocking(state.db_timeout(), "update_order", move || {
        orders.update_order(id, payload)
    })
    .await?;
    tracing::info!(target: "audit", order_id = id, version = order.version, operator = %user.username, "Order edited");
    Ok(Json(order))
}

/// POST /api/orders/{id}/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<Order>> {
    let orders = state.orders.clone();
    let order = run_blocking(state.db_timeout(), "cancel_order", move || {
        orders.cancel_order(id)
    })
    .await?;
    tracing::info!(target: "audit", order_id = id, operator = %user.username, role = %user.role, "Order cancelled");
    Ok(Json(order))
}
