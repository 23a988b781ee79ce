//! API Request types
//!
//! REST 层的请求载荷，由 axum 反序列化后传入服务层。

use serde::{Deserialize, Serialize};

use crate::models::OrderStatus;

/// 下单请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
}

/// 下单请求里的单个订单项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub menu_id: String,
    /// 数量；引擎校验必须为正
    pub quantity: i64,
}

/// 状态变更请求（人工改单）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// 数量变更请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateQuantityRequest {
    pub menu_id: String,
    pub quantity: i64,
}
