//! Repository implementations.
//!
//! - `inmemory`: process-local stores (tests, `--in-memory`)
//! - `sqlite`: durable store backed by a bundled SQLite database

pub mod inmemory;
pub mod sqlite;

pub use inmemory::{InMemoryMessageLog, InMemoryUserRepository};
pub use sqlite::SqliteStore;
