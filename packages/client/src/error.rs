//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The server rejected the token at upgrade time (HTTP 403)
    #[error("Server refused the connection: invalid or expired token")]
    Forbidden,

    /// Wrong username or password
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// Registration was rejected
    #[error("Registration failed: {0}")]
    RegistrationFailed(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}
