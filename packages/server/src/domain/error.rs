//! Domain errors.

use thiserror::Error;

use super::value_object::ConnectionId;

/// Errors raised while constructing value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("username must not be empty")]
    EmptyUserName,

    #[error("username must be at most {0} characters")]
    UserNameTooLong(usize),

    #[error("username '{0}' must not contain whitespace or commas")]
    InvalidUserName(String),

    #[error("message content must not be empty")]
    EmptyMessageContent,
}

/// Errors raised by the user store and the message log
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("username '{0}' is already registered")]
    DuplicateUser(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Identity gate failures (`Unauthenticated`)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("token is missing")]
    MissingToken,

    #[error("token is invalid: {0}")]
    InvalidToken(String),

    #[error("token is expired")]
    ExpiredToken,

    #[error("user '{0}' does not exist")]
    UnknownUser(String),

    #[error("failed to issue token: {0}")]
    IssueFailed(String),

    #[error("credential lookup failed: {0}")]
    Repository(#[from] RepositoryError),
}

/// Connection registry misuse
///
/// Never expected under correct session handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("connection '{0}' is already registered")]
    DuplicateConnection(ConnectionId),
}

/// Per-recipient delivery failure (`DeliveryFailure`)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("outbound channel of connection '{0}' is closed")]
    ChannelClosed(ConnectionId),

    #[error("outbound queue of connection '{0}' is full")]
    QueueFull(ConnectionId),

    #[error("failed to serialize event: {0}")]
    Serialize(String),
}
