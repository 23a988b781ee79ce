//! OrderEngine - 订单生命周期引擎
//!
//! 引擎是订单的唯一写入方，负责：
//!
//! - 创建订单（校验 + 价格快照 + 总额计算）
//! - 状态机流转（自动定时流转 + 人工改单 + 取消）
//! - 双存储编排（缓存 + 持久存储）
//! - 变更快照广播
//!
//! # 状态机
//!
//! ```text
//! RECEIVED ──(定时/人工)──→ PROCESSING ──→ COMPLETED (终态)
//!     │                         │
//!     └────────(取消)───────────┴──→ CANCELLED (终态)
//! ```
//!
//! # 并发
//!
//! 同一订单上的所有变更操作通过按 ID 的互斥锁线性化；
//! 自动流转任务在同一把锁内做触发时复查。取消待触发任务
//! 是尽力而为的中断，触发时复查才是权威保障，两者都必须存在。

use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use shared::message::topics;
use shared::models::{Order, OrderItem, OrderStatus};
use shared::request::OrderItemRequest;
use shared::util::now_millis;

use super::error::{OrderError, OrderResult};
use super::traits::{MenuLookup, NotificationSink};
use crate::core::Config;
use crate::store::{OrderCache, OrderStore, StoreError, StoreResult};

/// 引擎配置（[`Config`] 中与订单生命周期相关的子集）
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 自动 RECEIVED → PROCESSING 的延迟
    pub initial_delay: Duration,
    /// 可选: 自动 PROCESSING → COMPLETED 的延迟
    pub completion_delay: Option<Duration>,
    /// 缓存条目 TTL
    pub cache_ttl: Duration,
    /// 单次存储调用超时
    pub store_timeout: Duration,
    /// 持久存储保留窗口
    pub retention_window: Duration,
}

impl From<&Config> for EngineConfig {
    fn from(config: &Config) -> Self {
        Self {
            initial_delay: config.initial_delay,
            completion_delay: config.completion_delay,
            cache_ttl: config.cache_ttl,
            store_timeout: config.store_timeout,
            retention_window: config.retention_window,
        }
    }
}

/// 订单生命周期引擎
pub struct OrderEngine {
    cache: Arc<dyn OrderCache>,
    store: Arc<dyn OrderStore>,
    menu: Arc<dyn MenuLookup>,
    sink: Arc<dyn NotificationSink>,
    config: EngineConfig,
    /// 按订单 ID 的互斥锁表（变更操作线性化）
    locks: DashMap<String, Arc<Mutex<()>>>,
    /// 每个订单至多一个待触发的自动流转任务
    pending: DashMap<String, CancellationToken>,
    /// 人工改单标记：置位后自动流转对该订单永久失效
    manual_overrides: DashMap<String, ()>,
    /// 自引用弱指针，用于把引擎克隆进自动流转任务
    me: Weak<OrderEngine>,
}

impl std::fmt::Debug for OrderEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderEngine")
            .field("pending", &self.pending.len())
            .field("manual_overrides", &self.manual_overrides.len())
            .finish()
    }
}

impl OrderEngine {
    pub fn new(
        cache: Arc<dyn OrderCache>,
        store: Arc<dyn OrderStore>,
        menu: Arc<dyn MenuLookup>,
        sink: Arc<dyn NotificationSink>,
        config: EngineConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            cache,
            store,
            menu,
            sink,
            config,
            locks: DashMap::new(),
            pending: DashMap::new(),
            manual_overrides: DashMap::new(),
            me: me.clone(),
        })
    }

    // ========== Operations ==========

    /// 创建订单
    ///
    /// 校验订单项非空、数量为正、菜品存在且可用；任何一项失败则整单
    /// 失败且不产生写入。成功后写入两个存储、广播快照并安排自动流转。
    pub async fn create_order(&self, items: Vec<OrderItemRequest>) -> OrderResult<Order> {
        if items.is_empty() {
            return Err(OrderError::Validation(
                "Order must contain at least one item".to_string(),
            ));
        }

        let mut order_items = Vec::with_capacity(items.len());
        for req in &items {
            if req.quantity <= 0 {
                return Err(OrderError::Validation(
                    "Quantity must be greater than 0".to_string(),
                ));
            }
            let Some(info) = self.menu.resolve(&req.menu_id).await else {
                return Err(OrderError::Validation(format!(
                    "Menu item not found: {}",
                    req.menu_id
                )));
            };
            if !info.available {
                return Err(OrderError::Validation(format!(
                    "Menu item not available: {}",
                    req.menu_id
                )));
            }
            order_items.push(OrderItem {
                menu_id: req.menu_id.clone(),
                name: info.name,
                unit_price: info.price,
                quantity: req.quantity as u32,
            });
        }

        let total = Order::compute_total(&order_items);
        let order = Order {
            id: uuid::Uuid::new_v4().to_string(),
            items: order_items,
            status: OrderStatus::Received,
            timestamp: now_millis(),
            total,
        };

        self.write_both(&order).await?;
        self.sink.publish(topics::ORDERS, &order).await;
        self.schedule_auto_advance(&order.id);

        tracing::info!(order_id = %order.id, total = %order.total, "Order created");
        Ok(order)
    }

    /// 按 ID 读取订单
    ///
    /// 先查缓存；未命中或缓存故障时回落到持久存储。
    /// 两边都没有返回 `Ok(None)`。
    pub async fn get_order(&self, order_id: &str) -> OrderResult<Option<Order>> {
        match self.cache_get(order_id).await {
            Ok(Some(order)) => return Ok(Some(order)),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(order_id = %order_id, error = %e, "Cache read failed, falling back to durable store");
            }
        }
        Ok(self.store_get(order_id).await?)
    }

    /// 列出持久存储中的所有订单
    pub async fn list_orders(&self) -> OrderResult<Vec<Order>> {
        Ok(self.store.list_all().await?)
    }

    /// 人工状态修正
    ///
    /// 非终态订单可设置为任意目标状态；此后自动流转对该订单失效，
    /// 即使被改回 RECEIVED 也不会再自动推进。
    pub async fn update_status(
        &self,
        order_id: &str,
        new_status: OrderStatus,
    ) -> OrderResult<Option<Order>> {
        let _guard = self.lock_order(order_id).await;

        let Some(mut order) = self.get_order(order_id).await? else {
            return Ok(None);
        };
        self.ensure_not_terminal(&order)?;

        self.mark_manual_update(order_id);
        order.status = new_status;
        if new_status.is_terminal() {
            self.clear_tracking(order_id);
        }

        self.write_both(&order).await?;
        self.sink.publish(topics::ORDER_UPDATES, &order).await;
        tracing::info!(order_id = %order_id, status = %new_status, "Order status updated");
        Ok(Some(order))
    }

    /// 修改订单中某个菜品的数量，并从头重算总额
    pub async fn update_quantity(
        &self,
        order_id: &str,
        menu_id: &str,
        quantity: i64,
    ) -> OrderResult<Option<Order>> {
        let _guard = self.lock_order(order_id).await;

        let Some(mut order) = self.get_order(order_id).await? else {
            return Ok(None);
        };
        self.ensure_not_terminal(&order)?;

        if quantity <= 0 {
            return Err(OrderError::Validation(
                "Quantity must be greater than 0".to_string(),
            ));
        }
        let Some(item) = order.items.iter_mut().find(|i| i.menu_id == menu_id) else {
            return Err(OrderError::Validation(
                "Menu item not found in order".to_string(),
            ));
        };

        item.quantity = quantity as u32;
        order.recompute_total();
        self.mark_manual_update(order_id);

        self.write_both(&order).await?;
        self.sink.publish(topics::ORDER_UPDATES, &order).await;
        tracing::info!(order_id = %order_id, menu_id = %menu_id, quantity, total = %order.total, "Order quantity updated");
        Ok(Some(order))
    }

    /// 取消订单
    ///
    /// 终态订单不可取消。成功取消会中断待触发的自动流转任务，
    /// 该订单此后永远停留在 CANCELLED。
    pub async fn cancel(&self, order_id: &str) -> OrderResult<Option<Order>> {
        let _guard = self.lock_order(order_id).await;

        let Some(mut order) = self.get_order(order_id).await? else {
            return Ok(None);
        };
        self.ensure_not_terminal(&order)?;

        // 先中断定时任务再写状态；就算中断输给唤醒，
        // 任务在锁内的复查也会看到 CANCELLED
        self.mark_manual_update(order_id);
        order.status = OrderStatus::Cancelled;
        self.clear_tracking(order_id);

        self.write_both(&order).await?;
        self.sink.publish(topics::ORDER_UPDATES, &order).await;
        tracing::info!(order_id = %order_id, "Order cancelled");
        Ok(Some(order))
    }

    /// 清理持久存储中超过保留窗口的订单，返回删除数量
    pub async fn cleanup_old_orders(&self) -> OrderResult<usize> {
        let cutoff = now_millis() - self.config.retention_window.as_millis() as i64;
        let deleted = self.store.delete_older_than(cutoff).await?;
        if deleted > 0 {
            tracing::info!(deleted, "Old orders cleaned up");
        }
        Ok(deleted)
    }

    // ========== Automatic Transitions ==========

    /// 安排自动流转任务（每个订单至多一个）
    fn schedule_auto_advance(&self, order_id: &str) {
        // 引擎正在析构时不再安排新任务
        let Some(engine) = self.me.upgrade() else {
            return;
        };
        let token = CancellationToken::new();
        self.pending.insert(order_id.to_string(), token.clone());

        let id = order_id.to_string();
        tokio::spawn(async move {
            let advanced = engine
                .wait_and_advance(
                    &id,
                    &token,
                    engine.config.initial_delay,
                    OrderStatus::Received,
                    OrderStatus::Processing,
                )
                .await;

            if advanced && let Some(delay) = engine.config.completion_delay {
                engine
                    .wait_and_advance(
                        &id,
                        &token,
                        delay,
                        OrderStatus::Processing,
                        OrderStatus::Completed,
                    )
                    .await;
            }
            engine.pending.remove(&id);
        });
    }

    /// 睡满 `delay` 后在订单锁内复查并应用 `expected → next`
    ///
    /// 返回是否真的应用了流转。取消令牌只是尽力而为的快速退出；
    /// 锁内的状态/标记复查才是防住取消与唤醒竞争的权威保障。
    async fn wait_and_advance(
        &self,
        order_id: &str,
        token: &CancellationToken,
        delay: Duration,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> bool {
        tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!(order_id = %order_id, "Automatic transition interrupted");
                return false;
            }
            _ = tokio::time::sleep(delay) => {}
        }

        let _guard = self.lock_order(order_id).await;

        if self.manual_overrides.contains_key(order_id) {
            tracing::debug!(order_id = %order_id, "Order manually updated, skipping automatic transition");
            return false;
        }
        let mut order = match self.get_order(order_id).await {
            Ok(Some(order)) => order,
            Ok(None) => return false,
            Err(e) => {
                tracing::error!(order_id = %order_id, error = %e, "Failed to load order for automatic transition");
                return false;
            }
        };
        if order.status != expected {
            tracing::debug!(order_id = %order_id, status = %order.status, "Status changed before automatic transition, skipping");
            return false;
        }

        order.status = next;
        if let Err(e) = self.write_both(&order).await {
            // 后台路径没有调用方可通知；缓存里的新状态由对账任务补写到持久存储
            tracing::error!(order_id = %order_id, error = %e, "Durable write failed during automatic transition");
        }
        self.sink.publish(topics::ORDER_UPDATES, &order).await;
        tracing::info!(order_id = %order_id, status = %next, "Order advanced automatically");
        true
    }

    // ========== Internal Helpers ==========

    /// 获取订单的互斥锁（同一 ID 的变更操作串行执行）
    async fn lock_order(&self, order_id: &str) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(order_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }

    fn ensure_not_terminal(&self, order: &Order) -> OrderResult<()> {
        if order.status.is_terminal() {
            return Err(OrderError::Conflict(format!(
                "Order {} is already {}",
                order.id, order.status
            )));
        }
        Ok(())
    }

    /// 标记人工改单：中断待触发的自动流转并永久屏蔽后续自动流转
    fn mark_manual_update(&self, order_id: &str) {
        self.manual_overrides.insert(order_id.to_string(), ());
        if let Some((_, token)) = self.pending.remove(order_id) {
            token.cancel();
        }
    }

    /// 订单进入终态后清理跟踪状态（终态本身已屏蔽一切变更）
    fn clear_tracking(&self, order_id: &str) {
        self.manual_overrides.remove(order_id);
        if let Some((_, token)) = self.pending.remove(order_id) {
            token.cancel();
        }
    }

    /// 双写：先缓存后持久存储
    ///
    /// 缓存失败只降级（持久存储仍是权威）；持久存储失败向上传播，
    /// 缓存中存活的新状态留给对账任务收敛。
    async fn write_both(&self, order: &Order) -> OrderResult<()> {
        if let Err(e) = self.cache_put(order).await {
            tracing::warn!(order_id = %order.id, error = %e, "Cache write failed, serving from durable store");
        }
        self.store_upsert(order).await?;
        Ok(())
    }

    // ========== Bounded Store Calls ==========

    async fn cache_get(&self, order_id: &str) -> StoreResult<Option<Order>> {
        match timeout(self.config.store_timeout, self.cache.get(order_id)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.config.store_timeout)),
        }
    }

    async fn cache_put(&self, order: &Order) -> StoreResult<()> {
        match timeout(
            self.config.store_timeout,
            self.cache.put(order, self.config.cache_ttl),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.config.store_timeout)),
        }
    }

    async fn store_get(&self, order_id: &str) -> StoreResult<Option<Order>> {
        match timeout(self.config.store_timeout, self.store.get(order_id)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.config.store_timeout)),
        }
    }

    async fn store_upsert(&self, order: &Order) -> StoreResult<()> {
        match timeout(self.config.store_timeout, self.store.upsert(order)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.config.store_timeout)),
        }
    }
}
