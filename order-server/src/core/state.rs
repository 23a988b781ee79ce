//! 服务器状态
//!
//! [`ServerState`] 持有所有服务的共享引用，使用 Arc 实现浅拷贝。

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::{BackgroundTasks, Config, TaskKind};
use crate::menu::{CatalogStorage, CategoryService, MenuService};
use crate::message::MessageBus;
use crate::orders::{EngineConfig, OrderEngine, OrderSyncService};
use crate::store::{MemoryOrderCache, OrderCache, OrderStore, RedbOrderStore};

/// 服务器状态 - 持有所有服务的单例引用
///
/// # 服务组件
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | cache | 订单快速缓存 (易失) |
/// | store | 订单持久存储 (权威) |
/// | menu_service / category_service | 菜单目录 |
/// | engine | 订单生命周期引擎 |
/// | bus | 消息总线 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 订单快速缓存
    pub cache: Arc<dyn OrderCache>,
    /// 订单持久存储
    pub store: Arc<dyn OrderStore>,
    /// 菜单服务
    pub menu_service: Arc<MenuService>,
    /// 分类服务
    pub category_service: Arc<CategoryService>,
    /// 订单引擎
    pub engine: Arc<OrderEngine>,
    /// 消息总线
    pub bus: MessageBus,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录（确保存在）
    /// 2. redb 数据文件 (catalog.redb / orders.redb)
    /// 3. 各服务（菜单、分类、总线、引擎）
    ///
    /// # Panics
    ///
    /// 存储初始化失败时 panic
    pub fn initialize(config: &Config) -> Self {
        let work_dir = PathBuf::from(&config.work_dir);
        std::fs::create_dir_all(&work_dir).expect("Failed to create work directory");

        let catalog = CatalogStorage::open(work_dir.join("catalog.redb"))
            .expect("Failed to open catalog storage");
        let store = RedbOrderStore::open(work_dir.join("orders.redb"))
            .expect("Failed to open order store");

        Self::with_stores(
            config.clone(),
            Arc::new(MemoryOrderCache::new()),
            Arc::new(store),
            catalog,
        )
    }

    /// 用外部提供的存储构造状态（测试用内存后端）
    pub fn with_stores(
        config: Config,
        cache: Arc<dyn OrderCache>,
        store: Arc<dyn OrderStore>,
        catalog: CatalogStorage,
    ) -> Self {
        let menu_service = Arc::new(MenuService::new(catalog.clone()));
        let category_service = Arc::new(CategoryService::new(catalog));
        let bus = MessageBus::new();

        let engine = OrderEngine::new(
            cache.clone(),
            store.clone(),
            menu_service.clone(),
            Arc::new(bus.clone()),
            EngineConfig::from(&config),
        );

        Self {
            config,
            cache,
            store,
            menu_service,
            category_service,
            engine,
            bus,
        }
    }

    /// 注册后台任务
    ///
    /// 必须在 HTTP 服务启动之前调用。
    ///
    /// 注册的任务：
    /// - `order_sync` - 缓存 → 持久存储对账
    /// - `order_cleanup` - 保留期过期订单清理
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) {
        let shutdown = tasks.shutdown_token();

        let sync = OrderSyncService::new(
            self.cache.clone(),
            self.store.clone(),
            self.config.sync_interval,
            shutdown.clone(),
        );
        tasks.spawn("order_sync", TaskKind::Periodic, sync.run());

        let engine = self.engine.clone();
        let interval = self.config.cleanup_interval;
        tasks.spawn("order_cleanup", TaskKind::Periodic, async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = shutdown.cancelled() => {
                        tracing::info!("Order cleanup received shutdown signal");
                        return;
                    }
                }
                if let Err(e) = engine.cleanup_old_orders().await {
                    tracing::error!(error = %e, "Order cleanup pass failed, will retry next interval");
                }
            }
        });
    }
}
