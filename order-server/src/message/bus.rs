//! In-process message bus
//!
//! tokio broadcast channel 上的轻量封装。订阅者通过 [`MessageBus::subscribe`]
//! 拿到接收端，按 `topic` 自行分发；发布端不关心投递结果。

use async_trait::async_trait;
use tokio::sync::broadcast;

use shared::message::BusMessage;
use shared::models::Order;

use crate::orders::NotificationSink;

/// 广播通道容量（高峰期: 数千订单 × 数个事件）
const BUS_CHANNEL_CAPACITY: usize = 4096;

/// 进程内消息总线
#[derive(Clone, Debug)]
pub struct MessageBus {
    tx: broadcast::Sender<BusMessage>,
}

impl MessageBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// 订阅总线消息
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.tx.subscribe()
    }

    /// 当前订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// 发布任意可序列化资源到指定主题
    ///
    /// 序列化失败或没有活跃订阅者都只记录日志，不向调用方报错。
    pub fn publish_resource<T: serde::Serialize>(&self, topic: &str, data: &T) {
        let Some(msg) = BusMessage::new(topic, data) else {
            tracing::error!(topic = %topic, "Failed to serialize bus message, dropping");
            return;
        };
        if self.tx.send(msg).is_err() {
            tracing::debug!(topic = %topic, "No active subscribers, message dropped");
        }
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSink for MessageBus {
    async fn publish(&self, topic: &str, order: &Order) {
        self.publish_resource(topic, order);
    }
}
