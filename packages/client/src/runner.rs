//! Client execution logic with reconnection support.

use std::time::Duration;

use super::{
    auth::AuthClient,
    domain::should_attempt_reconnect,
    error::ClientError,
    session::run_client_session,
    ui::spawn_input_reader,
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_url: String,
    pub ws_url: String,
    pub username: String,
    pub password: String,
    /// Register the account before logging in
    pub register: bool,
}

/// Run the chat client with reconnection logic
///
/// A fresh token is requested before every connection attempt.
pub async fn run_client(options: ClientOptions) -> Result<(), ClientError> {
    let auth = AuthClient::new(&options.api_url);
    if options.register {
        auth.register(&options.username, &options.password).await?;
    }

    let mut input_rx = spawn_input_reader(&options.username);
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} as '{}' (attempt {}/{})",
            options.ws_url,
            options.username,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        let result = match auth.login(&options.username, &options.password).await {
            Ok(token) => {
                run_client_session(&options.ws_url, &token, &options.username, &mut input_rx)
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(end) => {
                tracing::info!("Client session ended ({:?})", end);
                return Ok(());
            }
            Err(e) => {
                reconnect_count += 1;
                if !should_attempt_reconnect(&e, reconnect_count, MAX_RECONNECT_ATTEMPTS) {
                    tracing::error!("{}", e);
                    return Err(e);
                }

                tracing::warn!("Connection lost: {}", e);
                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }
}
