//! UseCase: 履歴の再送準備
//!
//! 直近 N 件のメッセージを古い順に読み込み、投稿者名を解決して ChatEvent にします。
//! 投稿者が見つからない場合は "Unknown" として表示します。
//! 読み込みに失敗しても接続は拒否せず、空の履歴として扱います。

use std::{collections::HashMap, sync::Arc};

use crate::domain::{ChatEvent, MessageLog, UNKNOWN_AUTHOR, UserId, UserRepository};

/// 再送する履歴の既定件数
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

pub struct ReplayHistoryUseCase {
    message_log: Arc<dyn MessageLog>,
    user_repository: Arc<dyn UserRepository>,
    limit: usize,
}

impl ReplayHistoryUseCase {
    pub fn new(
        message_log: Arc<dyn MessageLog>,
        user_repository: Arc<dyn UserRepository>,
        limit: usize,
    ) -> Self {
        Self {
            message_log,
            user_repository,
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// 再送する履歴を古い順に返す
    pub async fn execute(&self) -> Vec<ChatEvent> {
        let messages = match self.message_log.recent(self.limit).await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!("Failed to load message history: {}", e);
                return Vec::new();
            }
        };

        let mut names: HashMap<UserId, String> = HashMap::new();
        let mut events = Vec::with_capacity(messages.len());
        for message in messages {
            let author_name = match names.get(&message.author_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self.resolve_name(message.author_id).await;
                    names.insert(message.author_id, name.clone());
                    name
                }
            };
            events.push(ChatEvent::message(
                author_name,
                message.content,
                message.timestamp,
            ));
        }
        events
    }

    async fn resolve_name(&self, author_id: UserId) -> String {
        match self.user_repository.find_by_id(author_id).await {
            Ok(Some(user)) => user.name.into_string(),
            Ok(None) => UNKNOWN_AUTHOR.to_string(),
            Err(e) => {
                tracing::warn!("Failed to resolve author {}: {}", author_id, e);
                UNKNOWN_AUTHOR.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::domain::{
        MessageContent, RepositoryError, StoredMessage, Timestamp, User, UserName,
        repository::{MockMessageLog, MockUserRepository},
    };

    fn stored(id: i64, author: i64, content: &str, millis: i64) -> StoredMessage {
        StoredMessage {
            id,
            author_id: UserId::new(author),
            content: MessageContent::new(content.to_string()).unwrap(),
            timestamp: Timestamp::new(DateTime::from_timestamp_millis(millis).unwrap()),
        }
    }

    fn user(id: i64, name: &str) -> User {
        User {
            id: UserId::new(id),
            name: UserName::new(name.to_string()).unwrap(),
            password_hash: String::new(),
        }
    }

    fn author_of(event: &ChatEvent) -> &str {
        match event {
            ChatEvent::Message { author_name, .. } => author_name,
            ChatEvent::System { .. } => panic!("expected message event"),
        }
    }

    #[tokio::test]
    async fn test_replay_resolves_authors_in_order() {
        // テスト項目: 履歴が古い順のまま投稿者名付きで返され、同じ投稿者は 1 回だけ検索される
        // given (前提条件):
        let mut log = MockMessageLog::new();
        log.expect_recent().withf(|limit| *limit == 50).returning(|_| {
            Ok(vec![
                stored(1, 1, "first", 1_000),
                stored(2, 2, "second", 2_000),
                stored(3, 1, "third", 3_000),
            ])
        });
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .withf(|id| *id == UserId::new(1))
            .times(1)
            .returning(|_| Ok(Some(user(1, "alice"))));
        users
            .expect_find_by_id()
            .withf(|id| *id == UserId::new(2))
            .times(1)
            .returning(|_| Ok(Some(user(2, "bob"))));
        let usecase = ReplayHistoryUseCase::new(Arc::new(log), Arc::new(users), 50);

        // when (操作):
        let events = usecase.execute().await;

        // then (期待する結果):
        let authors: Vec<&str> = events.iter().map(author_of).collect();
        assert_eq!(authors, vec!["alice", "bob", "alice"]);
    }

    #[tokio::test]
    async fn test_replay_unknown_author() {
        // テスト項目: 投稿者が存在しない履歴は "Unknown" として返される
        // given (前提条件):
        let mut log = MockMessageLog::new();
        log.expect_recent()
            .returning(|_| Ok(vec![stored(1, 42, "orphan", 1_000)]));
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        let usecase = ReplayHistoryUseCase::new(Arc::new(log), Arc::new(users), 50);

        // when (操作):
        let events = usecase.execute().await;

        // then (期待する結果):
        assert_eq!(events.len(), 1);
        assert_eq!(author_of(&events[0]), UNKNOWN_AUTHOR);
    }

    #[tokio::test]
    async fn test_replay_store_failure_returns_empty() {
        // テスト項目: 履歴の読み込みに失敗した場合は空の履歴になる
        // given (前提条件):
        let mut log = MockMessageLog::new();
        log.expect_recent()
            .returning(|_| Err(RepositoryError::Storage("disk gone".to_string())));
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().times(0);
        let usecase = ReplayHistoryUseCase::new(Arc::new(log), Arc::new(users), 50);

        // when (操作):
        let events = usecase.execute().await;

        // then (期待する結果):
        assert!(events.is_empty());
    }
}
