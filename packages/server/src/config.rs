//! Server configuration (command line with environment fallbacks).

use std::time::Duration;

use chrono::TimeDelta;
use clap::Parser;
use thiserror::Error;

use crate::ui::SessionConfig;

/// Upper bound for the access token lifetime (one year)
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("outbound capacity ({capacity}) must be at least the history limit ({history_limit})")]
    CapacityBelowHistory {
        capacity: usize,
        history_limit: usize,
    },

    #[error("token lifetime must be at most {0} minutes")]
    TokenLifetimeTooLong(i64),

    #[error("JWT secret must not be empty")]
    EmptySecret,
}

/// Hiroba chat server
#[derive(Parser, Debug, Clone)]
#[command(name = "hiroba-server", version, about = "Single-room WebSocket chat server", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HIROBA_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "HIROBA_PORT", default_value = "8080")]
    pub port: u16,

    /// SQLite database file
    #[arg(long, env = "HIROBA_DATABASE", default_value = "hiroba.db")]
    pub database: String,

    /// Keep users and messages in memory instead of SQLite
    #[arg(long, env = "HIROBA_IN_MEMORY")]
    pub in_memory: bool,

    /// Secret used to sign access tokens (random per process when omitted)
    #[arg(long, env = "HIROBA_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Access token lifetime in minutes
    #[arg(long, env = "HIROBA_TOKEN_TTL_MINUTES", default_value = "30")]
    pub token_ttl_minutes: i64,

    /// Number of recent messages replayed to a new connection
    #[arg(long, env = "HIROBA_HISTORY_LIMIT", default_value = "50")]
    pub history_limit: usize,

    /// Outbound queue capacity per connection
    #[arg(long, env = "HIROBA_OUTBOUND_CAPACITY", default_value = "256")]
    pub outbound_capacity: usize,

    /// Per-frame write timeout in milliseconds
    #[arg(long, env = "HIROBA_WRITE_TIMEOUT_MS", default_value = "2000")]
    pub write_timeout_ms: u64,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, env = "HIROBA_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_ttl_minutes <= 0 {
            return Err(ConfigError::Zero("token lifetime"));
        }
        self.token_ttl()?;
        if self.history_limit == 0 {
            return Err(ConfigError::Zero("history limit"));
        }
        if self.outbound_capacity == 0 {
            return Err(ConfigError::Zero("outbound capacity"));
        }
        if self.write_timeout_ms == 0 {
            return Err(ConfigError::Zero("write timeout"));
        }
        if self.outbound_capacity < self.history_limit {
            return Err(ConfigError::CapacityBelowHistory {
                capacity: self.outbound_capacity,
                history_limit: self.history_limit,
            });
        }
        if self.jwt_secret.as_deref() == Some("") {
            return Err(ConfigError::EmptySecret);
        }
        Ok(())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            outbound_capacity: self.outbound_capacity,
            write_timeout: Duration::from_millis(self.write_timeout_ms),
        }
    }

    pub fn token_ttl(&self) -> Result<TimeDelta, ConfigError> {
        if self.token_ttl_minutes > MAX_TOKEN_TTL_MINUTES {
            return Err(ConfigError::TokenLifetimeTooLong(MAX_TOKEN_TTL_MINUTES));
        }
        TimeDelta::try_minutes(self.token_ttl_minutes)
            .ok_or(ConfigError::TokenLifetimeTooLong(MAX_TOKEN_TTL_MINUTES))
    }
}
