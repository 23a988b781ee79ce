//! 消息总线模块
//!
//! 进程内 publish/subscribe 总线，承载订单与目录资源的变更通知。
//! 投递语义为尽力而为：没有订阅者或订阅者掉队时消息直接丢弃。

pub mod bus;

pub use bus::MessageBus;
