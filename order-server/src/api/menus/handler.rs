//! Menu API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;

use shared::message::topics;
use shared::models::{Menu, MenuCreate, MenuUpdate};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// GET /api/menus - 获取所有菜单项
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Menu>>> {
    Ok(Json(state.menu_service.list()?))
}

/// GET /api/menus/:id - 获取单个菜单项
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Menu>> {
    let menu = state
        .menu_service
        .get(&id)?
        .ok_or_else(|| AppError::not_found(format!("Menu {} not found", id)))?;
    Ok(Json(menu))
}

/// GET /api/menus/category/:category_id - 按分类获取菜单项
pub async fn list_by_category(
    State(state): State<ServerState>,
    Path(category_id): Path<String>,
) -> AppResult<Json<Vec<Menu>>> {
    Ok(Json(state.menu_service.list_by_category(&category_id)?))
}

/// POST /api/menus - 创建菜单项
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MenuCreate>,
) -> AppResult<(StatusCode, Json<Menu>)> {
    let menu = state.menu_service.create(payload)?;

    state
        .bus
        .publish_resource(topics::MENUS, &json!({ "action": "created", "data": &menu }));

    Ok((StatusCode::CREATED, Json(menu)))
}

/// PUT /api/menus/:id - 更新菜单项
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<MenuUpdate>,
) -> AppResult<Json<Menu>> {
    let menu = state.menu_service.update(&id, payload)?;

    state
        .bus
        .publish_resource(topics::MENUS, &json!({ "action": "updated", "data": &menu }));

    Ok(Json(menu))
}

/// DELETE /api/menus/:id - 删除菜单项
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    state.menu_service.delete(&id)?;

    state
        .bus
        .publish_resource(topics::MENUS, &json!({ "action": "deleted", "id": id }));

    Ok(Json(true))
}
