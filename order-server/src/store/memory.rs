//! In-memory order cache
//!
//! 进程内 DashMap 实现的快速缓存，条目按绝对过期时刻惰性淘汰：
//! 读到过期条目时当场移除并按未命中处理，`list_ids` 同样跳过过期条目。

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;

use shared::models::Order;
use shared::util::now_millis;

use super::{OrderCache, StoreResult};

/// 缓存条目：订单快照 + 绝对过期时刻 (Unix millis)
#[derive(Debug, Clone)]
struct CacheEntry {
    order: Order,
    expires_at: i64,
}

impl CacheEntry {
    fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

/// 基于 DashMap 的易失订单缓存
#[derive(Debug, Default)]
pub struct MemoryOrderCache {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryOrderCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// 当前驻留条目数（含未淘汰的过期条目，仅用于诊断）
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl OrderCache for MemoryOrderCache {
    async fn get(&self, order_id: &str) -> StoreResult<Option<Order>> {
        let now = now_millis();
        match self.entries.get(order_id) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.order.clone())),
            Some(_) => {}
            None => return Ok(None),
        }
        // 惰性淘汰；条件复查防止与并发 put 的新条目竞争
        self.entries
            .remove_if(order_id, |_, entry| entry.is_expired(now));
        Ok(None)
    }

    async fn put(&self, order: &Order, ttl: Duration) -> StoreResult<()> {
        let entry = CacheEntry {
            order: order.clone(),
            expires_at: now_millis() + ttl.as_millis() as i64,
        };
        self.entries.insert(order.id.clone(), entry);
        Ok(())
    }

    async fn list_ids(&self) -> StoreResult<Vec<String>> {
        let now = now_millis();
        Ok(self
            .entries
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .map(|entry| entry.key().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{OrderItem, OrderStatus};

    fn sample_order(id: &str) -> Order {
        Order {
            id: id.to_string(),
            items: vec![OrderItem {
                menu_id: "m1".to_string(),
                name: "Paella".to_string(),
                unit_price: Decimal::from(1200),
                quantity: 1,
            }],
            status: OrderStatus::Received,
            timestamp: now_millis(),
            total: Decimal::from(1200),
        }
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let cache = MemoryOrderCache::new();
        let order = sample_order("o1");
        cache.put(&order, Duration::from_secs(60)).await.unwrap();

        let got = cache.get("o1").await.unwrap().unwrap();
        assert_eq!(got, order);
        assert!(cache.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = MemoryOrderCache::new();
        let order = sample_order("o1");
        cache.put(&order, Duration::from_millis(0)).await.unwrap();

        // expires_at == now → 视为过期
        assert!(cache.get("o1").await.unwrap().is_none());
        assert!(cache.list_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_ids_skips_expired() {
        let cache = MemoryOrderCache::new();
        cache
            .put(&sample_order("live"), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .put(&sample_order("dead"), Duration::from_millis(0))
            .await
            .unwrap();

        let ids = cache.list_ids().await.unwrap();
        assert_eq!(ids, vec!["live".to_string()]);
    }

    #[tokio::test]
    async fn test_put_refreshes_entry() {
        let cache = MemoryOrderCache::new();
        let mut order = sample_order("o1");
        cache.put(&order, Duration::from_secs(60)).await.unwrap();

        order.status = OrderStatus::Processing;
        cache.put(&order, Duration::from_secs(60)).await.unwrap();

        let got = cache.get("o1").await.unwrap().unwrap();
        assert_eq!(got.status, OrderStatus::Processing);
        assert_eq!(cache.len(), 1);
    }
}
