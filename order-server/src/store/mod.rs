//! 订单存储层
//!
//! 两个独立的故障域：
//!
//! - [`OrderCache`] - 易失性快速缓存（热读写路径，条目带 TTL）
//! - [`OrderStore`] - 持久存储（权威数据源，可按时间清理）
//!
//! 引擎是两个存储的唯一写入方；进程内不保留任何跨请求的权威订单集合。
//! 缓存中的订单最终都会出现在持久存储里（对账任务兜底）。

pub mod durable;
pub mod memory;

pub use durable::RedbOrderStore;
pub use memory::MemoryOrderCache;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use shared::models::Order;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl StoreError {
    /// redb 错误统一收敛为 Storage
    pub fn storage(e: impl std::fmt::Display) -> Self {
        StoreError::Storage(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// 快速缓存 - 易失性、低延迟的订单键值存储
///
/// 条目按 TTL 过期；缓存故障降级读路径，不影响正确性。
#[async_trait]
pub trait OrderCache: Send + Sync {
    /// 按订单 ID 读取，未命中或已过期返回 None
    async fn get(&self, order_id: &str) -> StoreResult<Option<Order>>;

    /// 写入订单，`ttl` 后过期
    async fn put(&self, order: &Order, ttl: Duration) -> StoreResult<()>;

    /// 枚举当前驻留的所有订单 ID（对账任务使用）
    async fn list_ids(&self) -> StoreResult<Vec<String>>;
}

/// 持久存储 - 权威、持久的订单存储，可按时间查询清理
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// 按订单 ID 读取
    async fn get(&self, order_id: &str) -> StoreResult<Option<Order>>;

    /// 按 ID upsert（幂等，对账任务依赖此性质）
    async fn upsert(&self, order: &Order) -> StoreResult<()>;

    /// 列出所有订单
    async fn list_all(&self) -> StoreResult<Vec<Order>>;

    /// 删除 `cutoff_millis` 之前创建的所有订单，返回删除数量
    async fn delete_older_than(&self, cutoff_millis: i64) -> StoreResult<usize>;
}
