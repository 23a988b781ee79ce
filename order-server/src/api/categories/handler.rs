//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;

use shared::message::topics;
use shared::models::{Category, CategoryCreate, CategoryUpdate};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// GET /api/categories - 获取所有分类
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(state.category_service.list()?))
}

/// GET /api/categories/:id - 获取单个分类
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Category>> {
    let category = state
        .category_service
        .get(&id)?
        .ok_or_else(|| AppError::not_found(format!("Category {} not found", id)))?;
    Ok(Json(category))
}

/// POST /api/categories - 创建分类
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let category = state.category_service.create(payload)?;

    state.bus.publish_resource(
        topics::CATEGORIES,
        &json!({ "action": "created", "data": &category }),
    );

    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/:id - 更新分类
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    let category = state.category_service.update(&id, payload)?;

    state.bus.publish_resource(
        topics::CATEGORIES,
        &json!({ "action": "updated", "data": &category }),
    );

    Ok(Json(category))
}

/// DELETE /api/categories/:id - 删除分类 (分类下仍有菜单时返回 409)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    state.category_service.delete(&id)?;

    state.bus.publish_resource(
        topics::CATEGORIES,
        &json!({ "action": "deleted", "id": id }),
    );

    Ok(Json(true))
}
