//! Connection registry.
//!
//! Single source of truth for "who is currently connected". Entries are kept in
//! registration order and keyed by connection identity, so one user may hold
//! several connections. Every operation takes the same lock; readers get a
//! point-in-time copy and never iterate the live collection.

use tokio::sync::Mutex;

use super::{
    entity::Connection,
    error::RegistryError,
    value_object::{ConnectionId, UserName},
};

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: Mutex<Vec<Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a newly admitted connection.
    pub async fn add(&self, connection: Connection) -> Result<(), RegistryError> {
        let mut connections = self.connections.lock().await;
        if connections.iter().any(|c| c.id == connection.id) {
            return Err(RegistryError::DuplicateConnection(connection.id));
        }
        tracing::debug!(
            "Connection '{}' ({}) registered",
            connection.id,
            connection.user_name()
        );
        connections.push(connection);
        Ok(())
    }

    /// Remove the entry for `id`, returning it if it was still present.
    ///
    /// Removing an absent entry is a no-op.
    pub async fn remove(&self, id: &ConnectionId) -> Option<Connection> {
        let mut connections = self.connections.lock().await;
        let position = connections.iter().position(|c| &c.id == id)?;
        let removed = connections.remove(position);
        tracing::debug!(
            "Connection '{}' ({}) unregistered",
            removed.id,
            removed.user_name()
        );
        Some(removed)
    }

    /// Usernames of all registered connections in registration order.
    pub async fn list_usernames(&self) -> Vec<UserName> {
        let connections = self.connections.lock().await;
        connections.iter().map(|c| c.user_name().clone()).collect()
    }

    /// Point-in-time copy of all registered connections.
    pub async fn snapshot_connections(&self) -> Vec<Connection> {
        self.connections.lock().await.clone()
    }

    pub async fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.lock().await.iter().any(|c| &c.id == id)
    }

    pub async fn len(&self) -> usize {
        self.connections.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{
        entity::Identity, message_pusher::pusher_channel, value_object::UserId,
    };

    fn create_test_connection(id: i64, name: &str) -> Connection {
        let (tx, _rx) = pusher_channel(8);
        Connection::new(
            Identity::new(UserId::new(id), UserName::new(name.to_string()).unwrap()),
            tx,
        )
    }

    fn names(list: Vec<UserName>) -> Vec<String> {
        list.into_iter().map(UserName::into_string).collect()
    }

    #[tokio::test]
    async fn test_add_keeps_registration_order() {
        // テスト項目: 登録順にユーザー名が列挙される
        // given (前提条件):
        let registry = ConnectionRegistry::new();

        // when (操作):
        registry.add(create_test_connection(3, "charlie")).await.unwrap();
        registry.add(create_test_connection(1, "alice")).await.unwrap();
        registry.add(create_test_connection(2, "bob")).await.unwrap();

        // then (期待する結果):
        assert_eq!(
            names(registry.list_usernames().await),
            vec!["charlie", "alice", "bob"]
        );
    }

    #[tokio::test]
    async fn test_add_duplicate_connection_fails() {
        // テスト項目: 同じ接続を二重登録するとエラーになる
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let connection = create_test_connection(1, "alice");
        registry.add(connection.clone()).await.unwrap();

        // when (操作):
        let result = registry.add(connection.clone()).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RegistryError::DuplicateConnection(connection.id))
        );
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_same_user_may_hold_multiple_connections() {
        // テスト項目: 同じユーザーが複数接続を持てる（ユーザー名は重複して列挙される）
        // given (前提条件):
        let registry = ConnectionRegistry::new();

        // when (操作):
        registry.add(create_test_connection(1, "alice")).await.unwrap();
        registry.add(create_test_connection(1, "alice")).await.unwrap();

        // then (期待する結果):
        assert_eq!(
            names(registry.list_usernames().await),
            vec!["alice", "alice"]
        );
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        // テスト項目: 未登録の接続を削除しても何も起きない（冪等性）
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let connection = create_test_connection(1, "alice");
        registry.add(connection.clone()).await.unwrap();

        // when (操作):
        let first = registry.remove(&connection.id).await;
        let second = registry.remove(&connection.id).await;

        // then (期待する結果):
        assert!(first.is_some());
        assert!(second.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_usernames_matches_add_remove_sequence() {
        // テスト項目: add/remove の任意の列の後、登録済みで未削除の接続だけが登録順に残る
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let users = ["alice", "bob", "charlie", "dave", "erin", "frank"];
        let connections: Vec<Connection> = users
            .iter()
            .enumerate()
            .map(|(i, name)| create_test_connection(i as i64, name))
            .collect();

        // when (操作): 追加と削除を交互に行う
        let mut expected: Vec<&str> = Vec::new();
        for (i, connection) in connections.iter().enumerate() {
            registry.add(connection.clone()).await.unwrap();
            expected.push(users[i]);
            if i % 2 == 1 {
                let victim = &connections[i - 1];
                registry.remove(&victim.id).await;
                expected.retain(|n| *n != users[i - 1]);
            }
        }
        registry.remove(&connections[3].id).await;
        expected.retain(|n| *n != "dave");

        // then (期待する結果):
        assert_eq!(names(registry.list_usernames().await), expected);
    }

    #[tokio::test]
    async fn test_snapshot_is_not_affected_by_later_mutation() {
        // テスト項目: スナップショットはその後の add/remove の影響を受けない
        // given (前提条件):
        let registry = ConnectionRegistry::new();
        let alice = create_test_connection(1, "alice");
        registry.add(alice.clone()).await.unwrap();

        // when (操作):
        let snapshot = registry.snapshot_connections().await;
        registry.remove(&alice.id).await;
        registry.add(create_test_connection(2, "bob")).await.unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, alice.id);
    }

    #[tokio::test]
    async fn test_concurrent_add_and_remove() {
        // テスト項目: 並行した add/remove でもコレクションが壊れない
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let mut handles = Vec::new();

        // when (操作): 50 タスクがそれぞれ登録し、偶数番目だけ削除する
        for i in 0..50 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let connection = create_test_connection(i, &format!("user{}", i));
                registry.add(connection.clone()).await.unwrap();
                if i % 2 == 0 {
                    registry.remove(&connection.id).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // then (期待する結果):
        let remaining = registry.list_usernames().await;
        assert_eq!(remaining.len(), 25);
        assert!(
            remaining
                .iter()
                .all(|n| n.as_str()[4..].parse::<i64>().unwrap() % 2 == 1)
        );
    }
}
