//! UseCase: メッセージ送信処理
//!
//! 空のメッセージは保存もブロードキャストもせずに捨てます。
//! 保存に失敗したメッセージもブロードキャストしません。

use std::sync::Arc;

use crate::domain::{ChatEvent, Identity, MessageContent, MessageLog, MessagePusher};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    message_log: Arc<dyn MessageLog>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl SendMessageUseCase {
    pub fn new(message_log: Arc<dyn MessageLog>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            message_log,
            message_pusher,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - ブロードキャストを積めた受信者数
    /// * `Err(SendMessageError)` - 空メッセージ、または保存失敗
    pub async fn execute(
        &self,
        author: &Identity,
        text: String,
    ) -> Result<usize, SendMessageError> {
        let content = MessageContent::new(text).map_err(|_| SendMessageError::EmptyMessage)?;

        let timestamp = self
            .message_log
            .append(author.id, &content)
            .await
            .map_err(SendMessageError::StoreWriteFailure)?;

        let event = ChatEvent::message(author.name.as_str(), content, timestamp);
        Ok(self.message_pusher.broadcast(&event).await)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::DateTime;

    use super::*;
    use crate::domain::{
        Connection, MessagePushError, RepositoryError, Timestamp, UserId, UserName,
        repository::MockMessageLog,
    };

    /// broadcast されたイベントを記録するだけの MessagePusher
    #[derive(Default)]
    struct RecordingPusher {
        broadcasts: Mutex<Vec<ChatEvent>>,
    }

    #[async_trait]
    impl MessagePusher for RecordingPusher {
        async fn push_to(&self, _: &Connection, _: &ChatEvent) -> Result<(), MessagePushError> {
            Ok(())
        }

        async fn broadcast(&self, event: &ChatEvent) -> usize {
            self.broadcasts.lock().unwrap().push(event.clone());
            1
        }
    }

    fn alice() -> Identity {
        Identity::new(UserId::new(7), UserName::new("alice".to_string()).unwrap())
    }

    fn stamp() -> Timestamp {
        Timestamp::new(DateTime::from_timestamp_millis(1_700_000_000_000).unwrap())
    }

    #[tokio::test]
    async fn test_send_message_appends_then_broadcasts() {
        // テスト項目: メッセージは 1 回保存され、保存時刻付きで 1 回ブロードキャストされる
        // given (前提条件):
        let mut log = MockMessageLog::new();
        log.expect_append()
            .withf(|author, content| *author == UserId::new(7) && content.as_str() == "hi")
            .times(1)
            .returning(|_, _| Ok(stamp()));
        let pusher = Arc::new(RecordingPusher::default());
        let usecase = SendMessageUseCase::new(Arc::new(log), pusher.clone());

        // when (操作):
        let result = usecase.execute(&alice(), "hi".to_string()).await;

        // then (期待する結果):
        assert_eq!(result, Ok(1));
        let broadcasts = pusher.broadcasts.lock().unwrap();
        assert_eq!(
            *broadcasts,
            vec![ChatEvent::message(
                "alice",
                MessageContent::new("hi".to_string()).unwrap(),
                stamp()
            )]
        );
    }

    #[tokio::test]
    async fn test_send_message_empty_is_dropped() {
        // テスト項目: 空・空白だけのメッセージは保存もブロードキャストもされない
        // given (前提条件):
        let mut log = MockMessageLog::new();
        log.expect_append().times(0);
        let pusher = Arc::new(RecordingPusher::default());
        let usecase = SendMessageUseCase::new(Arc::new(log), pusher.clone());

        // when (操作):
        let empty = usecase.execute(&alice(), String::new()).await;
        let blank = usecase.execute(&alice(), " \t ".to_string()).await;

        // then (期待する結果):
        assert_eq!(empty, Err(SendMessageError::EmptyMessage));
        assert_eq!(blank, Err(SendMessageError::EmptyMessage));
        assert!(pusher.broadcasts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_message_store_failure_not_broadcast() {
        // テスト項目: 保存に失敗したメッセージはブロードキャストされない
        // given (前提条件):
        let mut log = MockMessageLog::new();
        log.expect_append()
            .times(1)
            .returning(|_, _| Err(RepositoryError::Storage("locked".to_string())));
        let pusher = Arc::new(RecordingPusher::default());
        let usecase = SendMessageUseCase::new(Arc::new(log), pusher.clone());

        // when (操作):
        let result = usecase.execute(&alice(), "hi".to_string()).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SendMessageError::StoreWriteFailure(RepositoryError::Storage(
                "locked".to_string()
            )))
        );
        assert!(pusher.broadcasts.lock().unwrap().is_empty());
    }
}
