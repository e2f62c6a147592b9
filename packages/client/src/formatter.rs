//! Message formatting utilities for client display.

use chrono::{FixedOffset, Local, Offset};
use hiroba_server::infrastructure::dto::websocket::ServerMessage;
use hiroba_shared::time::parse_rfc3339;

/// Message formatter for client display
pub struct MessageFormatter {
    offset: FixedOffset,
    username: String,
}

impl MessageFormatter {
    /// Formatter rendering times in the given offset
    pub fn new(username: impl Into<String>, offset: FixedOffset) -> Self {
        Self {
            offset,
            username: username.into(),
        }
    }

    /// Formatter rendering times in the local time zone
    pub fn local(username: impl Into<String>) -> Self {
        Self::new(username, Local::now().offset().fix())
    }

    /// Format any server frame
    pub fn format(&self, message: &ServerMessage) -> String {
        match message {
            ServerMessage::Message {
                username,
                content,
                timestamp,
            } => self.format_chat_message(username, content, timestamp),
            ServerMessage::System { content } => Self::format_system_message(content),
        }
    }

    /// `[HH:MM:SS] name: text`, with `You` for the own messages
    pub fn format_chat_message(&self, username: &str, content: &str, timestamp: &str) -> String {
        let time = match parse_rfc3339(timestamp) {
            Ok(time) => time.with_timezone(&self.offset).format("%H:%M:%S").to_string(),
            Err(_) => timestamp.to_string(),
        };
        let name = if username == self.username {
            "You"
        } else {
            username
        };
        format!("\r[{}] {}: {}\n", time, name, content)
    }

    /// `*** text`
    pub fn format_system_message(content: &str) -> String {
        format!("\r*** {}\n", content)
    }

    /// Frames that are not valid JSON
    pub fn format_raw_message(text: &str) -> String {
        format!("\r{}\n", text)
    }
}
