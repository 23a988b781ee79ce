//! Order API Module
//!
//! 订单的所有变更都经过 OrderEngine；HTTP 层只做参数解析和错误映射。

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", patch(handler::update_status))
        .route("/{id}/quantity", patch(handler::update_quantity))
        .route("/{id}/cancel", patch(handler::cancel))
}
