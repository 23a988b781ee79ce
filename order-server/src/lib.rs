//! Comanda Order Server - 餐厅点单后端
//!
//! # 架构概述
//!
//! 本模块是 Order Server 的主入口，提供以下核心功能：
//!
//! - **订单引擎** (`orders`): 订单生命周期状态机 + 双存储一致性
//! - **存储层** (`store`): 快速缓存 + 持久存储的抽象与实现
//! - **菜单目录** (`menu`): 菜单/分类 CRUD 与下单价格解析
//! - **消息总线** (`message`): 订单变更的实时推送
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! order-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── api/           # HTTP 路由和处理器
//! ├── orders/        # 订单生命周期引擎 + 对账任务
//! ├── store/         # 订单缓存/持久存储
//! ├── menu/          # 菜单与分类
//! ├── message/       # 消息总线
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod core;
pub mod menu;
pub mod message;
pub mod orders;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use message::MessageBus;
pub use orders::{OrderEngine, OrderError, OrderSyncService};
pub use store::{MemoryOrderCache, OrderCache, OrderStore, RedbOrderStore};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::init_logger;

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() {
    dotenv::dotenv().ok();
    init_logger();
}

pub fn print_banner() {
    println!(
        r#"
   ______                                 __
  / ____/___  ____ ___  ____ _____  ____/ /___ _
 / /   / __ \/ __ `__ \/ __ `/ __ \/ __  / __ `/
/ /___/ /_/ / / / / / / /_/ / / / / /_/ / /_/ /
\____/\____/_/ /_/ /_/\__,_/_/ /_/\__,_/\__,_/
    "#
    );
}
