//! Domain layer for the chat server.
//!
//! Value objects, entities, the connection registry and the trait seams
//! (repositories, identity verification, message pushing) that the usecase
//! layer depends on. Concrete implementations live in the infrastructure layer.

pub mod auth;
pub mod entity;
pub mod error;
pub mod event;
pub mod message_pusher;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use auth::{IdentityVerifier, PasswordHasher, TokenIssuer};
pub use entity::{Connection, Identity, StoredMessage, User};
pub use error::{
    AuthError, MessagePushError, RegistryError, RepositoryError, ValueObjectError,
};
pub use event::{ChatEvent, ClientRequest, ONLINE_COMMAND, UNKNOWN_AUTHOR};
pub use message_pusher::{MessagePusher, PusherChannel, PusherReceiver, pusher_channel};
pub use registry::ConnectionRegistry;
pub use repository::{MessageLog, UserRepository};
pub use value_object::{ConnectionId, MessageContent, Timestamp, UserId, UserName};
