//! Order Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 订单状态
///
/// `Completed` 和 `Cancelled` 是终态，到达后不允许再变更。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// 已接单（初始状态）
    #[default]
    Received,
    /// 厨房处理中
    Processing,
    /// 已完成（终态）
    Completed,
    /// 已取消（终态）
    Cancelled,
}

impl OrderStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Received => write!(f, "RECEIVED"),
            OrderStatus::Processing => write!(f, "PROCESSING"),
            OrderStatus::Completed => write!(f, "COMPLETED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// 订单项
///
/// `name` 和 `unit_price` 是下单时刻的菜单快照，之后菜单变价不影响已有订单。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// 菜单项引用
    pub menu_id: String,
    pub name: String,
    /// 下单时刻的单价
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl OrderItem {
    /// 行小计 = 单价 × 数量
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// 订单实体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// 订单 ID (UUID v4)，创建时分配，不可变
    pub id: String,
    /// 订单项（有效订单非空）
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    /// 创建时间 (Unix millis)，不可变；用于保留期清理
    pub timestamp: i64,
    /// 总额，始终等于 Σ(unit_price × quantity)
    pub total: Decimal,
}

impl Order {
    /// 按当前订单项从头重算总额
    pub fn compute_total(items: &[OrderItem]) -> Decimal {
        items.iter().map(|item| item.line_total()).sum()
    }

    /// 重算并更新 `total` 字段
    pub fn recompute_total(&mut self) {
        self.total = Self::compute_total(&self.items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(menu_id: &str, price: i64, qty: u32) -> OrderItem {
        OrderItem {
            menu_id: menu_id.to_string(),
            name: menu_id.to_string(),
            unit_price: Decimal::from(price),
            quantity: qty,
        }
    }

    #[test]
    fn test_total_is_sum_of_line_totals() {
        let items = vec![item("m1", 15000, 2), item("m2", 4000, 3)];
        assert_eq!(Order::compute_total(&items), Decimal::from(42000));
    }

    #[test]
    fn test_recompute_after_quantity_change() {
        let mut order = Order {
            id: "o1".to_string(),
            items: vec![item("m1", 15000, 2)],
            status: OrderStatus::Received,
            timestamp: 0,
            total: Decimal::from(30000),
        };
        order.items[0].quantity = 3;
        order.recompute_total();
        assert_eq!(order.total, Decimal::from(45000));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!OrderStatus::Received.is_terminal());
        assert!(!OrderStatus::Processing.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_serde_screaming_snake() {
        let json = serde_json::to_string(&OrderStatus::Received).unwrap();
        assert_eq!(json, "\"RECEIVED\"");
        let status: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(status, OrderStatus::Cancelled);
    }
}
