//! 菜单目录模块
//!
//! 菜单/分类 CRUD 以及订单引擎使用的价格解析 ([`crate::orders::MenuLookup`])。
//!
//! - **storage**: redb 持久化 (菜单、分类)
//! - **service**: 业务规则 (分类存在性校验、删除保护)

pub mod service;
pub mod storage;

pub use service::{CategoryService, MenuService};
pub use storage::CatalogStorage;
