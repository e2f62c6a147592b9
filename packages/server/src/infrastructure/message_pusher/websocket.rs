//! WebSocket を使った MessagePusher 実装（Broadcast Engine）
//!
//! ## 責務
//!
//! - ChatEvent を 1 度だけシリアライズし、各接続の送信キューへ積む
//! - 宛先ごとの失敗（キュー満杯・切断済み）を隔離する
//!
//! ## 設計ノート
//!
//! WebSocket への書き込みは UI 層の writer タスク（`ui/handler/websocket.rs`）が行います。
//! ここでは `try_send` でキューに積むだけなので、遅い相手がいても broadcast は待たされません。
//! 古いスナップショットに切断済みの接続が含まれていても、送信が失敗するだけで、
//! 登録の削除はその接続自身の切断処理が行います。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::error::TrySendError;

use crate::{
    domain::{ChatEvent, Connection, ConnectionRegistry, MessagePushError, MessagePusher},
    infrastructure::dto::websocket::ServerMessage,
};

pub struct WebSocketMessagePusher {
    /// 接続中のクライアント（スナップショットを取得して配送する）
    registry: Arc<ConnectionRegistry>,
}

impl WebSocketMessagePusher {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    fn serialize(event: &ChatEvent) -> Result<String, MessagePushError> {
        serde_json::to_string(&ServerMessage::from(event))
            .map_err(|e| MessagePushError::Serialize(e.to_string()))
    }

    fn enqueue(connection: &Connection, frame: String) -> Result<(), MessagePushError> {
        connection.sender.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => MessagePushError::QueueFull(connection.id),
            TrySendError::Closed(_) => MessagePushError::ChannelClosed(connection.id),
        })
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn push_to(
        &self,
        connection: &Connection,
        event: &ChatEvent,
    ) -> Result<(), MessagePushError> {
        let frame = Self::serialize(event)?;
        Self::enqueue(connection, frame)?;
        tracing::debug!(
            "Pushed event to connection '{}' ({})",
            connection.id,
            connection.user_name()
        );
        Ok(())
    }

    async fn broadcast(&self, event: &ChatEvent) -> usize {
        let frame = match Self::serialize(event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Dropping broadcast: {}", e);
                return 0;
            }
        };

        let targets = self.registry.snapshot_connections().await;
        let mut delivered = 0;
        for connection in &targets {
            // ブロードキャストでは一部の送信失敗を許容
            match Self::enqueue(connection, frame.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(
                    "Failed to push broadcast to '{}': {}",
                    connection.user_name(),
                    e
                ),
            }
        }
        tracing::debug!(
            "Broadcasted event to {}/{} connections",
            delivered,
            targets.len()
        );
        delivered
    }
}
