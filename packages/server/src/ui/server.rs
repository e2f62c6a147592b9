//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{health_check, issue_token, online_users, register, websocket_handler, welcome},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket chat server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(Arc::new(AppState::new(collaborators, 50, SessionConfig::default())));
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    app_state: Arc<AppState>,
}

impl Server {
    pub fn new(app_state: Arc<AppState>) -> Self {
        Self { app_state }
    }

    /// Build the router with every endpoint
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/", get(welcome))
            .route("/api/health", get(health_check))
            .route("/api/online", get(online_users))
            .route("/auth/register", post(register))
            .route("/auth/token", post(issue_token))
            .layer(TraceLayer::new_for_http())
            .with_state(self.app_state.clone())
    }

    /// Run the WebSocket chat server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(
        self,
        host: String,
        port: u16,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until Ctrl+C / SIGTERM
    pub async fn serve(
        self,
        listener: TcpListener,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = listener.local_addr()?;
        tracing::info!("Hiroba chat server listening on {}", addr);
        tracing::info!("Connect to: ws://{}/ws?token=<access_token>", addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
