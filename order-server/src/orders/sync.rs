//! 对账任务
//!
//! 周期性把缓存中的订单补写（upsert）进持久存储。主写路径已经同步
//! 双写，这里是兜底：持久存储写失败（或进程在异步写完成前重启）时，
//! 缓存中存活的订单仍会在下一轮对账收敛到持久存储。
//!
//! # 保证
//!
//! - 单键失败只记日志，不中断整轮扫描
//! - 按 ID upsert 幂等，重复执行安全
//! - 整轮失败靠下一个周期重试，任务本身永不退出

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::store::{OrderCache, OrderStore};

/// 一轮对账的统计结果
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// 成功补写的订单数
    pub synced: usize,
    /// 失败（已记日志，下轮重试）的订单数
    pub failed: usize,
}

/// 缓存 → 持久存储对账服务
pub struct OrderSyncService {
    cache: Arc<dyn OrderCache>,
    store: Arc<dyn OrderStore>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl OrderSyncService {
    pub fn new(
        cache: Arc<dyn OrderCache>,
        store: Arc<dyn OrderStore>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            cache,
            store,
            interval,
            shutdown,
        }
    }

    /// 主循环：固定间隔触发，直到 shutdown
    pub async fn run(self) {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Order sync service started");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Order sync service received shutdown signal");
                    return;
                }
            }

            let report = self.sync_once().await;
            if report.failed > 0 {
                tracing::warn!(
                    synced = report.synced,
                    failed = report.failed,
                    "Order sync pass finished with failures, will retry next interval"
                );
            } else if report.synced > 0 {
                tracing::debug!(synced = report.synced, "Order sync pass finished");
            }
        }
    }

    /// 执行一轮对账：枚举缓存键，逐个读出并 upsert 到持久存储
    pub async fn sync_once(&self) -> SyncReport {
        let mut report = SyncReport::default();

        let ids = match self.cache.list_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list cache keys, skipping sync pass");
                return report;
            }
        };

        for id in ids {
            let order = match self.cache.get(&id).await {
                Ok(Some(order)) => order,
                // 条目在枚举和读取之间过期了，下轮再看
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(order_id = %id, error = %e, "Failed to read cached order, skipping");
                    report.failed += 1;
                    continue;
                }
            };

            match self.store.upsert(&order).await {
                Ok(()) => {
                    tracing::debug!(order_id = %id, "Synced order to durable store");
                    report.synced += 1;
                }
                Err(e) => {
                    tracing::warn!(order_id = %id, error = %e, "Failed to sync order, skipping");
                    report.failed += 1;
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use shared::models::{Order, OrderItem, OrderStatus};
    use shared::util::now_millis;

    use crate::store::{MemoryOrderCache, RedbOrderStore, StoreError, StoreResult};

    fn sample_order(id: &str) -> Order {
        Order {
            id: id.to_string(),
            items: vec![OrderItem {
                menu_id: "m1".to_string(),
                name: "Pulpo".to_string(),
                unit_price: Decimal::from(2100),
                quantity: 1,
            }],
            status: OrderStatus::Received,
            timestamp: now_millis(),
            total: Decimal::from(2100),
        }
    }

    fn service(
        cache: Arc<dyn OrderCache>,
        store: Arc<dyn OrderStore>,
    ) -> OrderSyncService {
        OrderSyncService::new(
            cache,
            store,
            Duration::from_secs(60),
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn test_sync_folds_cache_into_store() {
        let cache = Arc::new(MemoryOrderCache::new());
        let store = Arc::new(RedbOrderStore::open_in_memory().unwrap());

        cache
            .put(&sample_order("o1"), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .put(&sample_order("o2"), Duration::from_secs(60))
            .await
            .unwrap();

        let sync = service(cache.clone(), store.clone());
        let report = sync.sync_once().await;

        assert_eq!(report.synced, 2);
        assert_eq!(report.failed, 0);
        assert!(store.get("o1").await.unwrap().is_some());
        assert!(store.get("o2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        let cache = Arc::new(MemoryOrderCache::new());
        let store = Arc::new(RedbOrderStore::open_in_memory().unwrap());

        cache
            .put(&sample_order("o1"), Duration::from_secs(60))
            .await
            .unwrap();

        let sync = service(cache.clone(), store.clone());
        sync.sync_once().await;
        let first = store.list_all().await.unwrap();

        // 缓存未变，再跑一轮必须得到完全相同的持久状态
        sync.sync_once().await;
        let second = store.list_all().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.len(), 1);
    }

    /// 对指定 ID 写入失败的持久存储
    struct PartiallyBrokenStore {
        inner: RedbOrderStore,
        poison_id: String,
    }

    #[async_trait]
    impl OrderStore for PartiallyBrokenStore {
        async fn get(&self, order_id: &str) -> StoreResult<Option<Order>> {
            self.inner.get(order_id).await
        }
        async fn upsert(&self, order: &Order) -> StoreResult<()> {
            if order.id == self.poison_id {
                return Err(StoreError::Unavailable("write rejected".to_string()));
            }
            self.inner.upsert(order).await
        }
        async fn list_all(&self) -> StoreResult<Vec<Order>> {
            self.inner.list_all().await
        }
        async fn delete_older_than(&self, cutoff_millis: i64) -> StoreResult<usize> {
            self.inner.delete_older_than(cutoff_millis).await
        }
    }

    #[tokio::test]
    async fn test_per_key_failure_does_not_abort_the_sweep() {
        let cache = Arc::new(MemoryOrderCache::new());
        let store = Arc::new(PartiallyBrokenStore {
            inner: RedbOrderStore::open_in_memory().unwrap(),
            poison_id: "bad".to_string(),
        });

        cache
            .put(&sample_order("bad"), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .put(&sample_order("good"), Duration::from_secs(60))
            .await
            .unwrap();

        let sync = service(cache, store.clone());
        let report = sync.sync_once().await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.synced, 1);
        assert!(store.get("good").await.unwrap().is_some());
        assert!(store.get("bad").await.unwrap().is_none());
    }
}
