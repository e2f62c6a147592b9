//! WebSocket frame DTOs.

use serde::{Deserialize, Serialize};

/// Server → client frame
///
/// ```json
/// {"type": "message", "username": "alice", "content": "hi", "timestamp": "2024-01-01T00:00:00.000Z"}
/// {"type": "system", "content": "alice joined the chat."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Message {
        username: String,
        content: String,
        timestamp: String,
    },
    System {
        content: String,
    },
}

/// Client → server frame
///
/// `{"content": "..."}` sends chat text, `{"command": "online"}` queries online users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl ClientFrame {
    pub fn chat(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            command: None,
        }
    }

    pub fn command(command: impl Into<String>) -> Self {
        Self {
            content: None,
            command: Some(command.into()),
        }
    }

    /// Parse a text frame. Anything that is not a JSON object of this shape is an error.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
