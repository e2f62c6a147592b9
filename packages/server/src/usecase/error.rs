//! UseCase errors.

use thiserror::Error;

use crate::domain::{MessagePushError, RegistryError, RepositoryError, ValueObjectError};

/// 参加者接続のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to replay history: {0}")]
    HistoryDelivery(#[from] MessagePushError),
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("failed to store message: {0}")]
    StoreWriteFailure(RepositoryError),
}

/// ユーザー登録のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("invalid username: {0}")]
    InvalidUserName(#[from] ValueObjectError),

    #[error("password must not be empty")]
    EmptyPassword,

    #[error("username '{0}' is already registered")]
    DuplicateUser(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<RepositoryError> for RegisterError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::DuplicateUser(name) => Self::DuplicateUser(name),
            RepositoryError::Storage(detail) => Self::Storage(detail),
        }
    }
}

/// トークン発行のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssueTokenError {
    #[error("incorrect username or password")]
    InvalidCredentials,

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("failed to issue token: {0}")]
    IssueFailed(String),
}
