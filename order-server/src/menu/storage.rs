//! redb-based catalog storage
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `menus` | `menu_id` | JSON `Menu` | 菜单项 |
//! | `categories` | `category_id` | JSON `Category` | 分类 |

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

use shared::models::{Category, Menu};

use crate::store::{StoreError, StoreResult};

/// key = id, value = JSON 序列化实体
type JsonTable = TableDefinition<'static, &'static str, &'static [u8]>;

const MENUS_TABLE: JsonTable = TableDefinition::new("menus");
const CATEGORIES_TABLE: JsonTable = TableDefinition::new("categories");

/// Catalog storage backed by redb
#[derive(Clone)]
pub struct CatalogStorage {
    db: Arc<Database>,
}

impl CatalogStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path).map_err(StoreError::storage)?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(StoreError::storage)?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    fn init_tables(&self) -> StoreResult<()> {
        let write_txn = self.db.begin_write().map_err(StoreError::storage)?;
        {
            let _ = write_txn
                .open_table(MENUS_TABLE)
                .map_err(StoreError::storage)?;
            let _ = write_txn
                .open_table(CATEGORIES_TABLE)
                .map_err(StoreError::storage)?;
        }
        write_txn.commit().map_err(StoreError::storage)?;
        Ok(())
    }

    // ========== Generic helpers ==========

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        table: JsonTable,
        id: &str,
    ) -> StoreResult<Option<T>> {
        let read_txn = self.db.begin_read().map_err(StoreError::storage)?;
        let table = read_txn.open_table(table).map_err(StoreError::storage)?;
        match table.get(id).map_err(StoreError::storage)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    fn upsert_json<T: serde::Serialize>(
        &self,
        table: JsonTable,
        id: &str,
        value: &T,
    ) -> StoreResult<()> {
        let bytes = serde_json::to_vec(value)?;
        let write_txn = self.db.begin_write().map_err(StoreError::storage)?;
        {
            let mut table = write_txn.open_table(table).map_err(StoreError::storage)?;
            table
                .insert(id, bytes.as_slice())
                .map_err(StoreError::storage)?;
        }
        write_txn.commit().map_err(StoreError::storage)?;
        Ok(())
    }

    fn delete_row(&self, table: JsonTable, id: &str) -> StoreResult<bool> {
        let write_txn = self.db.begin_write().map_err(StoreError::storage)?;
        let existed = {
            let mut table = write_txn.open_table(table).map_err(StoreError::storage)?;
            table.remove(id).map_err(StoreError::storage)?.is_some()
        };
        write_txn.commit().map_err(StoreError::storage)?;
        Ok(existed)
    }

    fn list_json<T: serde::de::DeserializeOwned>(
        &self,
        table: JsonTable,
    ) -> StoreResult<Vec<T>> {
        let read_txn = self.db.begin_read().map_err(StoreError::storage)?;
        let table = read_txn.open_table(table).map_err(StoreError::storage)?;
        let mut rows = Vec::new();
        for entry in table.iter().map_err(StoreError::storage)? {
            let (_, value) = entry.map_err(StoreError::storage)?;
            rows.push(serde_json::from_slice(value.value())?);
        }
        Ok(rows)
    }

    // ========== Menus ==========

    pub fn get_menu(&self, id: &str) -> StoreResult<Option<Menu>> {
        self.get_json(MENUS_TABLE, id)
    }

    pub fn upsert_menu(&self, menu: &Menu) -> StoreResult<()> {
        self.upsert_json(MENUS_TABLE, &menu.id, menu)
    }

    pub fn delete_menu(&self, id: &str) -> StoreResult<bool> {
        self.delete_row(MENUS_TABLE, id)
    }

    pub fn list_menus(&self) -> StoreResult<Vec<Menu>> {
        self.list_json(MENUS_TABLE)
    }

    /// 某分类下的所有菜单（全表扫描，目录规模下足够）
    pub fn list_menus_by_category(&self, category_id: &str) -> StoreResult<Vec<Menu>> {
        Ok(self
            .list_menus()?
            .into_iter()
            .filter(|m| m.category_id == category_id)
            .collect())
    }

    /// 分类下是否还有菜单（删除保护）
    pub fn category_has_menus(&self, category_id: &str) -> StoreResult<bool> {
        Ok(!self.list_menus_by_category(category_id)?.is_empty())
    }

    // ========== Categories ==========

    pub fn get_category(&self, id: &str) -> StoreResult<Option<Category>> {
        self.get_json(CATEGORIES_TABLE, id)
    }

    pub fn upsert_category(&self, category: &Category) -> StoreResult<()> {
        self.upsert_json(CATEGORIES_TABLE, &category.id, category)
    }

    pub fn delete_category(&self, id: &str) -> StoreResult<bool> {
        self.delete_row(CATEGORIES_TABLE, id)
    }

    pub fn list_categories(&self) -> StoreResult<Vec<Category>> {
        self.list_json(CATEGORIES_TABLE)
    }
}
