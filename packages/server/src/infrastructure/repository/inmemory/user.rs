//! InMemory User Repository 実装
//!
//! ドメイン層が定義する UserRepository trait の具体的な実装。
//! Vec をインメモリ DB として使用します。ID は 1 から順に採番します。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, User, UserId, UserName, UserRepository};

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, name: UserName, password_hash: String) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.name == name) {
            return Err(RepositoryError::DuplicateUser(name.into_string()));
        }
        let user = User {
            id: UserId::new(users.len() as i64 + 1),
            name,
            password_hash,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_name(&self, name: &UserName) -> Result<Option<User>, RepositoryError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| &u.name == name).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }
}
