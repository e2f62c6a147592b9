//! Conversion logic between DTOs and domain types.

use crate::domain::{ChatEvent, ClientRequest, ONLINE_COMMAND, User};
use crate::infrastructure::dto::{http as http_dto, websocket as ws_dto};

// ========================================
// DTO → Domain
// ========================================

impl From<ws_dto::ClientFrame> for ClientRequest {
    fn from(frame: ws_dto::ClientFrame) -> Self {
        if frame.command.as_deref() == Some(ONLINE_COMMAND) {
            return ClientRequest::OnlineUsers;
        }
        match frame.content {
            Some(content) => ClientRequest::Chat(content),
            None => ClientRequest::Unrecognized,
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&ChatEvent> for ws_dto::ServerMessage {
    fn from(event: &ChatEvent) -> Self {
        match event {
            ChatEvent::System { content } => Self::System {
                content: content.clone(),
            },
            ChatEvent::Message {
                author_name,
                content,
                timestamp,
            } => Self::Message {
                username: author_name.clone(),
                content: content.as_str().to_string(),
                timestamp: timestamp.to_rfc3339(),
            },
        }
    }
}

impl From<&User> for http_dto::UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.value(),
            username: user.name.as_str().to_string(),
        }
    }
}
