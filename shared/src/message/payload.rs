use serde::{Deserialize, Serialize};

use crate::util::now_millis;

// ==================== Topics ====================

/// 订阅主题常量
pub mod topics {
    /// 新订单快照
    pub const ORDERS: &str = "orders";
    /// 订单变更快照（状态、数量、取消）
    pub const ORDER_UPDATES: &str = "orders/update";
    /// 菜单资源变更
    pub const MENUS: &str = "menus";
    /// 分类资源变更
    pub const CATEGORIES: &str = "categories";
}

// ==================== Bus Message ====================

/// 总线消息 (服务端 -> 订阅者)
///
/// `data` 是资源快照的 JSON 序列化，订阅者按 `topic` 分发。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusMessage {
    /// 主题
    pub topic: String,
    /// 资源快照 (JSON)
    pub data: serde_json::Value,
    /// 发布时间 (Unix millis)
    pub published_at: i64,
}

impl BusMessage {
    /// 从可序列化资源构造消息
    ///
    /// 序列化失败时返回 None（调用方记录日志后丢弃，尽力投递语义）。
    pub fn new<T: Serialize>(topic: &str, data: &T) -> Option<Self> {
        let data = serde_json::to_value(data).ok()?;
        Some(Self {
            topic: topic.to_string(),
            data,
            published_at: now_millis(),
        })
    }
}
