//! 订单生命周期模块
//!
//! 本模块实现订单后端的核心：状态机 + 双存储一致性。
//!
//! - **engine**: 订单引擎（创建、状态流转、数量修改、取消、自动流转）
//! - **sync**: 对账任务（缓存 → 持久存储）与保留期清理
//! - **traits**: 引擎消费的外部协作方契约（菜单解析、通知下发）
//!
//! # 架构
//!
//! ```text
//! Request → OrderEngine ──→ OrderCache (易失, TTL)
//!               │       └──→ OrderStore (权威, 持久)
//!               ├──→ NotificationSink (订单快照广播)
//!               └──→ 自动流转定时任务 (可取消, 触发时复查)
//!
//! OrderSyncService:  OrderCache ──(周期 upsert)──→ OrderStore
//! ```
//!
//! # 一致性
//!
//! 每次变更同步双写（先缓存后持久存储）；持久存储写失败向调用方传播，
//! 同时缓存里存活的新状态由对账任务周期性补写，保证最终收敛。

pub mod engine;
pub mod error;
pub mod sync;
pub mod traits;

// Re-exports
pub use engine::{EngineConfig, OrderEngine};
pub use error::{OrderError, OrderResult};
pub use sync::OrderSyncService;
pub use traits::{MenuInfo, MenuLookup, NotificationSink};
