//! SQLite Repository 実装
//!
//! ユーザー（資格情報）とメッセージを 1 つの SQLite データベースに永続化します。
//! rusqlite は同期 API なので `Arc<Mutex<Connection>>` で共有し、
//! 各操作は `tokio::task::spawn_blocking` 上で実行します。

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use hiroba_shared::time::{Clock, parse_rfc3339};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};

use crate::domain::{
    MessageContent, MessageLog, RepositoryError, StoredMessage, Timestamp, User, UserId,
    UserName, UserRepository,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    username        TEXT    NOT NULL UNIQUE,
    hashed_password TEXT    NOT NULL
);
CREATE TABLE IF NOT EXISTS messages (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL REFERENCES users(id),
    content    TEXT    NOT NULL,
    created_at TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages (created_at);
";

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    clock: Arc<dyn Clock>,
}

impl SqliteStore {
    /// Open (or create) the database file and apply the schema.
    pub fn open(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| RepositoryError::Storage(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(storage)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(storage)?;
        tracing::info!("Database opened at {}", path.display());
        Self::with_connection(conn, clock)
    }

    pub fn open_in_memory(clock: Arc<dyn Clock>) -> Result<Self, RepositoryError> {
        let conn = Connection::open_in_memory().map_err(storage)?;
        Self::with_connection(conn, clock)
    }

    fn with_connection(conn: Connection, clock: Arc<dyn Clock>) -> Result<Self, RepositoryError> {
        // messages.user_id must point at an existing user
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(storage)?;
        conn.execute_batch(SCHEMA).map_err(storage)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            clock,
        })
    }

    async fn run<T, F>(&self, f: F) -> Result<T, RepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, RepositoryError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::Storage(format!("database lock poisoned: {}", e)))?;
            f(&guard)
        })
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?
    }
}

fn storage(e: rusqlite::Error) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

fn row_to_user(
    id: i64,
    username: String,
    hashed_password: String,
) -> Result<User, RepositoryError> {
    let name = UserName::new(username).map_err(|e| RepositoryError::Storage(e.to_string()))?;
    Ok(User {
        id: UserId::new(id),
        name,
        password_hash: hashed_password,
    })
}

fn find_user(
    conn: &Connection,
    sql: &str,
    param: &dyn rusqlite::ToSql,
) -> Result<Option<User>, RepositoryError> {
    let row = conn
        .query_row(sql, [param], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .optional()
        .map_err(storage)?;
    row.map(|(id, username, hashed)| row_to_user(id, username, hashed))
        .transpose()
}

#[async_trait]
impl UserRepository for SqliteStore {
    async fn create(&self, name: UserName, password_hash: String) -> Result<User, RepositoryError> {
        self.run(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO users (username, hashed_password) VALUES (?1, ?2)",
                params![name.as_str(), password_hash],
            );
            match inserted {
                Ok(_) => Ok(User {
                    id: UserId::new(conn.last_insert_rowid()),
                    name,
                    password_hash,
                }),
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    Err(RepositoryError::DuplicateUser(name.into_string()))
                }
                Err(e) => Err(storage(e)),
            }
        })
        .await
    }

    async fn find_by_name(&self, name: &UserName) -> Result<Option<User>, RepositoryError> {
        let name = name.as_str().to_string();
        self.run(move |conn| {
            find_user(
                conn,
                "SELECT id, username, hashed_password FROM users WHERE username = ?1",
                &name,
            )
        })
        .await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.run(move |conn| {
            find_user(
                conn,
                "SELECT id, username, hashed_password FROM users WHERE id = ?1",
                &id.value(),
            )
        })
        .await
    }
}

#[async_trait]
impl MessageLog for SqliteStore {
    async fn append(
        &self,
        author_id: UserId,
        content: &MessageContent,
    ) -> Result<Timestamp, RepositoryError> {
        let timestamp = Timestamp::new(self.clock.now());
        let content = content.as_str().to_string();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO messages (user_id, content, created_at) VALUES (?1, ?2, ?3)",
                params![author_id.value(), content, timestamp.to_rfc3339()],
            )
            .map_err(storage)?;
            Ok(timestamp)
        })
        .await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<StoredMessage>, RepositoryError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.run(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, user_id, content, created_at FROM messages
                     ORDER BY created_at DESC, id DESC LIMIT ?1",
                )
                .map_err(storage)?;
            let rows = stmt
                .query_map([limit], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                })
                .map_err(storage)?;

            let mut messages = Vec::new();
            for row in rows {
                let (id, user_id, content, created_at) = row.map_err(storage)?;
                let timestamp = parse_rfc3339(&created_at)
                    .map_err(|e| RepositoryError::Storage(format!("message {}: {}", id, e)))?;
                let Ok(content) = MessageContent::new(content) else {
                    tracing::warn!("Skipping blank message {} in history", id);
                    continue;
                };
                messages.push(StoredMessage {
                    id,
                    author_id: UserId::new(user_id),
                    content,
                    timestamp: Timestamp::new(timestamp),
                });
            }
            messages.reverse();
            Ok(messages)
        })
        .await
    }
}
