//! Menu Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 菜单项实体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Menu {
    pub id: String,
    pub name: String,
    pub description: String,
    /// 单价
    pub price: Decimal,
    /// 所属分类引用
    pub category_id: String,
    pub image_url: Option<String>,
    /// 下架的菜品不能出现在新订单里
    pub available: bool,
    pub best_seller: bool,
}

/// Create menu payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub category_id: String,
    pub image_url: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub best_seller: bool,
}

fn default_available() -> bool {
    true
}

/// Update menu payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuUpdate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub category_id: String,
    pub image_url: Option<String>,
    pub available: bool,
    #[serde(default)]
    pub best_seller: bool,
}
