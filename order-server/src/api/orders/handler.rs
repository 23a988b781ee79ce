//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use shared::models::Order;
use shared::request::{CreateOrderRequest, UpdateQuantityRequest, UpdateStatusRequest};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// POST /api/orders - 下单
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = state.engine.create_order(payload.items).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders - 获取所有订单
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    let orders = state.engine.list_orders().await?;
    Ok(Json(orders))
}

/// GET /api/orders/:id - 获取单个订单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state
        .engine
        .get_order(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;
    Ok(Json(order))
}

/// PATCH /api/orders/:id/status - 人工状态修正
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .engine
        .update_status(&id, payload.status)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;
    Ok(Json(order))
}

/// PATCH /api/orders/:id/quantity - 修改菜品数量
pub async fn update_quantity(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .engine
        .update_quantity(&id, &payload.menu_id, payload.quantity)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;
    Ok(Json(order))
}

/// PATCH /api/orders/:id/cancel - 取消订单
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state
        .engine
        .cancel(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;
    Ok(Json(order))
}
