//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装（InMemory, SQLite）は Infrastructure 層が提供します（依存性の逆転）。
//!
//! どちらも遅い外部呼び出しとして扱い、ConnectionRegistry のロックを保持したまま呼ばないこと。

use async_trait::async_trait;

use super::{
    entity::{StoredMessage, User},
    error::RepositoryError,
    value_object::{MessageContent, Timestamp, UserId, UserName},
};

/// User Repository trait（資格情報ストア）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーを作成。同名ユーザーが存在する場合は `RepositoryError::DuplicateUser`
    async fn create(&self, name: UserName, password_hash: String) -> Result<User, RepositoryError>;

    /// ユーザー名で検索
    async fn find_by_name(&self, name: &UserName) -> Result<Option<User>, RepositoryError>;

    /// ID で検索
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
}

/// Message Log trait（追記専用のメッセージストア）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageLog: Send + Sync {
    /// メッセージを追記し、記録された時刻を返す
    async fn append(
        &self,
        author_id: UserId,
        content: &MessageContent,
    ) -> Result<Timestamp, RepositoryError>;

    /// 直近 `limit` 件を古い順に返す
    async fn recent(&self, limit: usize) -> Result<Vec<StoredMessage>, RepositoryError>;
}
