//! Entities.

use super::{
    message_pusher::PusherChannel,
    value_object::{ConnectionId, MessageContent, Timestamp, UserId, UserName},
};

/// Resolved, authenticated user bound to a connection for its lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub name: UserName,
}

impl Identity {
    pub fn new(id: UserId, name: UserName) -> Self {
        Self { id, name }
    }
}

/// Durable user record owned by the credential store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: UserName,
    pub password_hash: String,
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.name.clone())
    }
}

/// An admitted connection: outbound channel plus the bound identity
///
/// The registry keeps clones of this value; it never creates or closes the channel.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub identity: Identity,
    pub sender: PusherChannel,
}

impl Connection {
    pub fn new(identity: Identity, sender: PusherChannel) -> Self {
        Self {
            id: ConnectionId::generate(),
            identity,
            sender,
        }
    }

    pub fn user_name(&self) -> &UserName {
        &self.identity.name
    }
}

/// A persisted chat message as returned by the message log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: i64,
    pub author_id: UserId,
    pub content: MessageContent,
    pub timestamp: Timestamp,
}
