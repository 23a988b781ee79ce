//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单接口
//! - [`menus`] - 菜单管理接口
//! - [`categories`] - 分类管理接口

pub mod categories;
pub mod health;
pub mod menus;
pub mod orders;

use axum::Router;

use crate::core::ServerState;

/// 汇总所有资源路由
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(menus::router())
        .merge(categories::router())
}

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
