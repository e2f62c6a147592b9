//! InMemory Repository 実装

pub mod message;
pub mod user;

pub use message::InMemoryMessageLog;
pub use user::InMemoryUserRepository;
