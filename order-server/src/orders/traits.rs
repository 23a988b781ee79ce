//! 订单引擎的外部协作方契约

use async_trait::async_trait;
use rust_decimal::Decimal;

use shared::models::Order;

/// 菜单解析结果：下单时刻的价格快照
#[derive(Debug, Clone)]
pub struct MenuInfo {
    pub name: String,
    pub price: Decimal,
    pub available: bool,
}

/// 菜单解析 - 按菜单 ID 解析当前价格与可用性
#[async_trait]
pub trait MenuLookup: Send + Sync {
    /// 未知 ID 返回 None
    async fn resolve(&self, menu_id: &str) -> Option<MenuInfo>;
}

/// 通知下发 - 订单快照的 fire-and-forget 广播
///
/// 引擎不要求投递确认；单次 publish 至多一次投递。
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, topic: &str, order: &Order);
}
