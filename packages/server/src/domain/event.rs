//! Events exchanged over a chat connection.

use super::value_object::{MessageContent, Timestamp, UserName};

/// Display name used for history entries whose author no longer resolves
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Control command asking for the list of online users
pub const ONLINE_COMMAND: &str = "online";

/// Server-to-client payload, delivered to one or more connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Join/leave/online-list notices
    System { content: String },
    /// A chat message (live or replayed from history)
    Message {
        author_name: String,
        content: MessageContent,
        timestamp: Timestamp,
    },
}

impl ChatEvent {
    pub fn joined(name: &UserName) -> Self {
        Self::System {
            content: format!("{} joined the chat.", name),
        }
    }

    pub fn left(name: &UserName) -> Self {
        Self::System {
            content: format!("{} left the chat.", name),
        }
    }

    pub fn online_users(names: &[UserName]) -> Self {
        let joined = names
            .iter()
            .map(UserName::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        Self::System {
            content: format!("Online users: {}", joined),
        }
    }

    pub fn message(
        author_name: impl Into<String>,
        content: MessageContent,
        timestamp: Timestamp,
    ) -> Self {
        Self::Message {
            author_name: author_name.into(),
            content,
            timestamp,
        }
    }
}

/// Client-to-server request after parsing an inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientRequest {
    /// `{ "command": "online" }`
    OnlineUsers,
    /// `{ "content": "..." }` (may still be blank; validated by the send usecase)
    Chat(String),
    /// Well-formed but carries nothing we act on
    Unrecognized,
}
