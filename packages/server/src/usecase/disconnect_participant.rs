//! UseCase: 参加者切断処理
//!
//! 登録から外せた場合に限り退室通知を送るので、同じ接続に対して何度呼んでも
//! 通知は 1 回だけです。

use std::sync::Arc;

use crate::domain::{ChatEvent, ConnectionId, ConnectionRegistry, MessagePusher, UserName};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    registry: Arc<ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    pub fn new(registry: Arc<ConnectionRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 参加者切断を実行
    ///
    /// # Returns
    ///
    /// * `Some(UserName)` - 登録から外して退室通知を送った
    /// * `None` - 既に登録されていなかった（何もしない）
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<UserName> {
        let removed = self.registry.remove(connection_id).await?;
        let name = removed.identity.name;
        let delivered = self.message_pusher.broadcast(&ChatEvent::left(&name)).await;
        tracing::info!(
            "'{}' left; notified {} remaining connection(s)",
            name,
            delivered
        );
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Connection, Identity, PusherReceiver, UserId, pusher_channel},
        infrastructure::message_pusher::WebSocketMessagePusher,
    };

    fn connection(id: i64, name: &str) -> (Connection, PusherReceiver) {
        let (tx, rx) = pusher_channel(16);
        let identity = Identity::new(UserId::new(id), UserName::new(name.to_string()).unwrap());
        (Connection::new(identity, tx), rx)
    }

    fn drain(rx: &mut PusherReceiver) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(frame);
        }
        frames
    }

    #[tokio::test]
    async fn test_disconnect_participant_notifies_remaining() {
        // テスト項目: 切断すると登録から外れ、残りの参加者に退室通知が届く
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new(registry.clone()));
        let usecase = DisconnectParticipantUseCase::new(registry.clone(), pusher);
        let (alice, _alice_rx) = connection(1, "alice");
        let (bob, mut bob_rx) = connection(2, "bob");
        registry.add(alice.clone()).await.unwrap();
        registry.add(bob).await.unwrap();

        // when (操作):
        let result = usecase.execute(&alice.id).await;

        // then (期待する結果):
        assert_eq!(result.map(UserName::into_string), Some("alice".to_string()));
        assert!(!registry.contains(&alice.id).await);
        assert_eq!(
            drain(&mut bob_rx),
            vec![r#"{"type":"system","content":"alice left the chat."}"#.to_string()]
        );
    }

    #[tokio::test]
    async fn test_disconnect_participant_is_idempotent() {
        // テスト項目: 同じ接続の切断を 2 回実行しても、状態は 1 回目と同じで退室通知も 1 回だけ
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new(registry.clone()));
        let usecase = DisconnectParticipantUseCase::new(registry.clone(), pusher);
        let (alice, _alice_rx) = connection(1, "alice");
        let (bob, mut bob_rx) = connection(2, "bob");
        registry.add(alice.clone()).await.unwrap();
        registry.add(bob).await.unwrap();

        // when (操作):
        let first = usecase.execute(&alice.id).await;
        let names_after_first = registry.list_usernames().await;
        let second = usecase.execute(&alice.id).await;

        // then (期待する結果):
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(registry.list_usernames().await, names_after_first);
        assert_eq!(drain(&mut bob_rx).len(), 1);
    }
}
