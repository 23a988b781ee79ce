//! 订单引擎错误类型
//!
//! NotFound 不是错误：引擎操作对缺失订单返回 `Ok(None)`，
//! 由调用方决定是否致命（API 层映射为 404）。

use thiserror::Error;

use crate::store::StoreError;

/// Engine errors
#[derive(Debug, Error)]
pub enum OrderError {
    /// 请求本身不成立（空订单、未知菜品、非正数量）；不会产生任何写入
    #[error("Validation failed: {0}")]
    Validation(String),

    /// 操作与订单当前（终）态冲突；不会产生任何写入
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 持久存储调用失败或超时；写入未持久化，调用方可重试
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
}

pub type OrderResult<T> = Result<T, OrderError>;
