//! 菜单与分类服务
//!
//! 订单引擎只通过 [`MenuLookup`] 看到菜单：按 ID 解析出名称、单价
//! 和可用性，其余目录管理对引擎不可见。

use async_trait::async_trait;

use shared::models::{Category, CategoryCreate, CategoryUpdate, Menu, MenuCreate, MenuUpdate};

use crate::menu::CatalogStorage;
use crate::orders::{MenuInfo, MenuLookup};
use crate::utils::{AppError, AppResult};

/// 菜单服务
#[derive(Clone)]
pub struct MenuService {
    storage: CatalogStorage,
}

impl MenuService {
    pub fn new(storage: CatalogStorage) -> Self {
        Self { storage }
    }

    /// 创建菜单项；所属分类必须存在
    pub fn create(&self, payload: MenuCreate) -> AppResult<Menu> {
        let category = self.storage.get_category(&payload.category_id)?;
        if category.is_none() {
            tracing::warn!(category_id = %payload.category_id, "Menu creation rejected: category not found");
            return Err(AppError::validation("Category not found"));
        }

        let menu = Menu {
            id: uuid::Uuid::new_v4().to_string(),
            name: payload.name,
            description: payload.description,
            price: payload.price,
            category_id: payload.category_id,
            image_url: payload.image_url,
            available: payload.available,
            best_seller: payload.best_seller,
        };
        self.storage.upsert_menu(&menu)?;
        tracing::info!(menu_id = %menu.id, name = %menu.name, "Menu item created");
        Ok(menu)
    }

    pub fn list(&self) -> AppResult<Vec<Menu>> {
        Ok(self.storage.list_menus()?)
    }

    pub fn get(&self, id: &str) -> AppResult<Option<Menu>> {
        Ok(self.storage.get_menu(id)?)
    }

    pub fn list_by_category(&self, category_id: &str) -> AppResult<Vec<Menu>> {
        Ok(self.storage.list_menus_by_category(category_id)?)
    }

    pub fn update(&self, id: &str, payload: MenuUpdate) -> AppResult<Menu> {
        let Some(mut menu) = self.storage.get_menu(id)? else {
            return Err(AppError::not_found(format!("Menu {} not found", id)));
        };
        if self.storage.get_category(&payload.category_id)?.is_none() {
            return Err(AppError::validation("Category not found"));
        }

        menu.name = payload.name;
        menu.description = payload.description;
        menu.price = payload.price;
        menu.category_id = payload.category_id;
        menu.image_url = payload.image_url;
        menu.available = payload.available;
        menu.best_seller = payload.best_seller;

        self.storage.upsert_menu(&menu)?;
        Ok(menu)
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        if !self.storage.delete_menu(id)? {
            return Err(AppError::not_found(format!("Menu {} not found", id)));
        }
        tracing::info!(menu_id = %id, "Menu item deleted");
        Ok(())
    }
}

#[async_trait]
impl MenuLookup for MenuService {
    async fn resolve(&self, menu_id: &str) -> Option<MenuInfo> {
        match self.storage.get_menu(menu_id) {
            Ok(menu) => menu.map(|m| MenuInfo {
                name: m.name,
                price: m.price,
                available: m.available,
            }),
            Err(e) => {
                tracing::error!(menu_id = %menu_id, error = %e, "Menu lookup failed");
                None
            }
        }
    }
}

/// 分类服务
#[derive(Clone)]
pub struct CategoryService {
    storage: CatalogStorage,
}

impl CategoryService {
    pub fn new(storage: CatalogStorage) -> Self {
        Self { storage }
    }

    pub fn create(&self, payload: CategoryCreate) -> AppResult<Category> {
        let category = Category {
            id: uuid::Uuid::new_v4().to_string(),
            name: payload.name,
            description: payload.description,
        };
        self.storage.upsert_category(&category)?;
        Ok(category)
    }

    pub fn list(&self) -> AppResult<Vec<Category>> {
        Ok(self.storage.list_categories()?)
    }

    pub fn get(&self, id: &str) -> AppResult<Option<Category>> {
        Ok(self.storage.get_category(id)?)
    }

    pub fn update(&self, id: &str, payload: CategoryUpdate) -> AppResult<Category> {
        let Some(mut category) = self.storage.get_category(id)? else {
            tracing::warn!(category_id = %id, "Attempted to update non-existent category");
            return Err(AppError::not_found(format!("Category {} not found", id)));
        };
        category.name = payload.name;
        category.description = payload.description;
        self.storage.upsert_category(&category)?;
        tracing::info!(category_id = %id, name = %category.name, "Category updated");
        Ok(category)
    }

    /// 删除分类；仍有菜单挂在分类下时拒绝
    pub fn delete(&self, id: &str) -> AppResult<()> {
        if self.storage.get_category(id)?.is_none() {
            return Err(AppError::not_found(format!("Category {} not found", id)));
        }
        if self.storage.category_has_menus(id)? {
            return Err(AppError::conflict(
                "Cannot delete category with existing menu items",
            ));
        }
        self.storage.delete_category(id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn services() -> (MenuService, CategoryService) {
        let storage = CatalogStorage::open_in_memory().unwrap();
        (
            MenuService::new(storage.clone()),
            CategoryService::new(storage),
        )
    }

    fn menu_payload(category_id: &str) -> MenuCreate {
        MenuCreate {
            name: "Tortilla".to_string(),
            description: "De patatas".to_string(),
            price: Decimal::from(950),
            category_id: category_id.to_string(),
            image_url: None,
            available: true,
            best_seller: false,
        }
    }

    #[test]
    fn test_menu_requires_existing_category() {
        let (menus, _) = services();
        let err = menus.create(menu_payload("nope")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_menu_crud_roundtrip() {
        let (menus, categories) = services();
        let cat = categories
            .create(CategoryCreate {
                name: "Tapas".to_string(),
                description: String::new(),
            })
            .unwrap();

        let menu = menus.create(menu_payload(&cat.id)).unwrap();
        assert_eq!(menus.get(&menu.id).unwrap().unwrap().name, "Tortilla");
        assert_eq!(menus.list_by_category(&cat.id).unwrap().len(), 1);

        menus.delete(&menu.id).unwrap();
        assert!(menus.get(&menu.id).unwrap().is_none());
    }

    #[test]
    fn test_category_delete_blocked_while_menus_exist() {
        let (menus, categories) = services();
        let cat = categories
            .create(CategoryCreate {
                name: "Tapas".to_string(),
                description: String::new(),
            })
            .unwrap();
        let menu = menus.create(menu_payload(&cat.id)).unwrap();

        let err = categories.delete(&cat.id).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        menus.delete(&menu.id).unwrap();
        categories.delete(&cat.id).unwrap();
        assert!(categories.get(&cat.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_menu_lookup_resolves_snapshot() {
        let (menus, categories) = services();
        let cat = categories
            .create(CategoryCreate {
                name: "Tapas".to_string(),
                description: String::new(),
            })
            .unwrap();
        let menu = menus.create(menu_payload(&cat.id)).unwrap();

        let info = menus.resolve(&menu.id).await.unwrap();
        assert_eq!(info.name, "Tortilla");
        assert_eq!(info.price, Decimal::from(950));
        assert!(info.available);

        assert!(menus.resolve("missing").await.is_none());
    }
}
