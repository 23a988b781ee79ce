//! Message Bus Types
//!
//! 服务端向订阅者推送变更通知所用的消息结构。
//! 传输层不在此定义，总线只保证单次 publish 至多一次投递。

pub mod payload;

// Re-exports
pub use payload::{BusMessage, topics};
