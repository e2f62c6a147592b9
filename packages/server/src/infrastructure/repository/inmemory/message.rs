//! InMemory Message Log 実装
//!
//! 追記専用の Vec をインメモリ DB として使用します。
//! 時刻は注入された Clock で記録します。

use std::sync::Arc;

use async_trait::async_trait;
use hiroba_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    MessageContent, MessageLog, RepositoryError, StoredMessage, Timestamp, UserId,
};

pub struct InMemoryMessageLog {
    messages: Mutex<Vec<StoredMessage>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryMessageLog {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            clock,
        }
    }

    /// 記録済みのメッセージ件数
    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.lock().await.is_empty()
    }
}

#[async_trait]
impl MessageLog for InMemoryMessageLog {
    async fn append(
        &self,
        author_id: UserId,
        content: &MessageContent,
    ) -> Result<Timestamp, RepositoryError> {
        let timestamp = Timestamp::new(self.clock.now());
        let mut messages = self.messages.lock().await;
        let message = StoredMessage {
            id: messages.len() as i64 + 1,
            author_id,
            content: content.clone(),
            timestamp,
        };
        messages.push(message);
        Ok(timestamp)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<StoredMessage>, RepositoryError> {
        let messages = self.messages.lock().await;
        let mut ordered: Vec<StoredMessage> = messages.clone();
        ordered.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        let skip = ordered.len().saturating_sub(limit);
        Ok(ordered.into_iter().skip(skip).collect())
    }
}
