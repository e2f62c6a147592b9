//! Hiroba chat server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --database ./hiroba.db
//! HIROBA_JWT_SECRET=change-me cargo run --bin hiroba-server -- --in-memory
//! ```

use std::sync::Arc;

use clap::Parser;
use hiroba_server::{
    config::ServerConfig,
    domain::{ConnectionRegistry, MessageLog, UserRepository},
    infrastructure::{
        auth::{JwtAuthority, Sha256PasswordHasher, generate_secret},
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryMessageLog, InMemoryUserRepository, SqliteStore},
    },
    ui::{AppState, Server, state::Collaborators},
};
use hiroba_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};

type Stores = (Arc<dyn UserRepository>, Arc<dyn MessageLog>);

fn open_stores(config: &ServerConfig, clock: Arc<dyn Clock>) -> Result<Stores, String> {
    if config.in_memory {
        tracing::info!("Using in-memory stores; data is lost on shutdown");
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let messages: Arc<dyn MessageLog> = Arc::new(InMemoryMessageLog::new(clock));
        return Ok((users, messages));
    }

    let store = Arc::new(SqliteStore::open(&config.database, clock).map_err(|e| e.to_string())?);
    tracing::info!("Using SQLite database at {}", config.database);
    let users: Arc<dyn UserRepository> = store.clone();
    let messages: Arc<dyn MessageLog> = store;
    Ok((users, messages))
}

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    // Initialize dependencies in order:
    // 1. Stores
    // 2. Credentials
    // 3. Registry and MessagePusher
    // 4. AppState (UseCases)
    // 5. Server
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 1. Stores
    let (user_repository, message_log) = match open_stores(&config, clock.clone()) {
        Ok(stores) => stores,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    // 2. Credentials
    let secret = match &config.jwt_secret {
        Some(secret) => secret.as_bytes().to_vec(),
        None => {
            tracing::warn!(
                "HIROBA_JWT_SECRET is not set; using a random secret. Tokens will not survive a restart."
            );
            generate_secret()
        }
    };
    let token_ttl = match config.token_ttl() {
        Ok(ttl) => ttl,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let authority = Arc::new(JwtAuthority::new(
        &secret,
        token_ttl,
        user_repository.clone(),
        clock,
    ));

    // 3. Registry and MessagePusher
    let registry = Arc::new(ConnectionRegistry::new());
    let message_pusher = Arc::new(WebSocketMessagePusher::new(registry.clone()));

    // 4. AppState
    let app_state = AppState::new(
        Collaborators {
            registry,
            message_pusher,
            user_repository,
            message_log,
            identity_verifier: authority.clone(),
            token_issuer: authority,
            password_hasher: Arc::new(Sha256PasswordHasher::default()),
        },
        config.history_limit,
        config.session_config(),
    );

    // 5. Server
    let server = Server::new(Arc::new(app_state));
    if let Err(e) = server.run(config.host.clone(), config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
