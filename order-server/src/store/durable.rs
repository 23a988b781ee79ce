//! redb-based durable order store
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | JSON `Order` | 权威订单存储 |
//!
//! # Durability
//!
//! redb 默认 `Durability::Immediate`：commit 返回即持久化，
//! copy-on-write + 原子指针切换保证掉电后文件仍处于一致状态。

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

use shared::models::Order;

use super::{OrderStore, StoreError, StoreResult};

/// Table for storing orders: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Durable order store backed by redb
#[derive(Clone)]
pub struct RedbOrderStore {
    db: Arc<Database>,
}

impl RedbOrderStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path).map_err(StoreError::storage)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(StoreError::storage)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> StoreResult<()> {
        let write_txn = self.db.begin_write().map_err(StoreError::storage)?;
        {
            let _ = write_txn
                .open_table(ORDERS_TABLE)
                .map_err(StoreError::storage)?;
        }
        write_txn.commit().map_err(StoreError::storage)?;
        Ok(())
    }

    // ========== Sync Inner Operations ==========

    fn get_sync(&self, order_id: &str) -> StoreResult<Option<Order>> {
        let read_txn = self.db.begin_read().map_err(StoreError::storage)?;
        let table = read_txn
            .open_table(ORDERS_TABLE)
            .map_err(StoreError::storage)?;
        match table.get(order_id).map_err(StoreError::storage)? {
            Some(guard) => {
                let order: Order = serde_json::from_slice(guard.value())?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    fn upsert_sync(&self, order: &Order) -> StoreResult<()> {
        let bytes = serde_json::to_vec(order)?;
        let write_txn = self.db.begin_write().map_err(StoreError::storage)?;
        {
            let mut table = write_txn
                .open_table(ORDERS_TABLE)
                .map_err(StoreError::storage)?;
            table
                .insert(order.id.as_str(), bytes.as_slice())
                .map_err(StoreError::storage)?;
        }
        write_txn.commit().map_err(StoreError::storage)?;
        Ok(())
    }

    fn list_all_sync(&self) -> StoreResult<Vec<Order>> {
        let read_txn = self.db.begin_read().map_err(StoreError::storage)?;
        let table = read_txn
            .open_table(ORDERS_TABLE)
            .map_err(StoreError::storage)?;
        let mut orders = Vec::new();
        for entry in table.iter().map_err(StoreError::storage)? {
            let (_, value) = entry.map_err(StoreError::storage)?;
            let order: Order = serde_json::from_slice(value.value())?;
            orders.push(order);
        }
        Ok(orders)
    }

    fn delete_older_than_sync(&self, cutoff_millis: i64) -> StoreResult<usize> {
        let write_txn = self.db.begin_write().map_err(StoreError::storage)?;
        let deleted = {
            let mut table = write_txn
                .open_table(ORDERS_TABLE)
                .map_err(StoreError::storage)?;

            // 先收集过期键，再逐个删除（迭代期间不能修改表）
            let mut stale_ids = Vec::new();
            for entry in table.iter().map_err(StoreError::storage)? {
                let (key, value) = entry.map_err(StoreError::storage)?;
                let order: Order = serde_json::from_slice(value.value())?;
                if order.timestamp < cutoff_millis {
                    stale_ids.push(key.value().to_string());
                }
            }

            for id in &stale_ids {
                table.remove(id.as_str()).map_err(StoreError::storage)?;
            }
            stale_ids.len()
        };
        write_txn.commit().map_err(StoreError::storage)?;
        Ok(deleted)
    }
}

#[async_trait]
impl OrderStore for RedbOrderStore {
    async fn get(&self, order_id: &str) -> StoreResult<Option<Order>> {
        self.get_sync(order_id)
    }

    async fn upsert(&self, order: &Order) -> StoreResult<()> {
        self.upsert_sync(order)
    }

    async fn list_all(&self) -> StoreResult<Vec<Order>> {
        self.list_all_sync()
    }

    async fn delete_older_than(&self, cutoff_millis: i64) -> StoreResult<usize> {
        self.delete_older_than_sync(cutoff_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{OrderItem, OrderStatus};

    fn sample_order(id: &str, timestamp: i64) -> Order {
        Order {
            id: id.to_string(),
            items: vec![OrderItem {
                menu_id: "m1".to_string(),
                name: "Gazpacho".to_string(),
                unit_price: Decimal::from(800),
                quantity: 2,
            }],
            status: OrderStatus::Received,
            timestamp,
            total: Decimal::from(1600),
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let store = RedbOrderStore::open_in_memory().unwrap();
        let order = sample_order("o1", 1000);

        store.upsert(&order).await.unwrap();
        let got = store.get("o1").await.unwrap().unwrap();
        assert_eq!(got, order);

        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_by_id() {
        let store = RedbOrderStore::open_in_memory().unwrap();
        let mut order = sample_order("o1", 1000);

        store.upsert(&order).await.unwrap();
        order.status = OrderStatus::Processing;
        store.upsert(&order).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn test_delete_older_than() {
        let store = RedbOrderStore::open_in_memory().unwrap();
        store.upsert(&sample_order("old", 1000)).await.unwrap();
        store.upsert(&sample_order("new", 5000)).await.unwrap();

        let deleted = store.delete_older_than(2000).await.unwrap();
        assert_eq!(deleted, 1);

        assert!(store.get("old").await.unwrap().is_none());
        assert!(store.get("new").await.unwrap().is_some());
    }
}
