//! WebSocket connection handlers.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use serde::Deserialize;

use crate::{
    domain::{Identity, PusherReceiver, pusher_channel},
    ui::{session::ChatSession, state::AppState},
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

/// `GET /ws?token=...`
///
/// The token is checked before the upgrade; a missing or invalid token is answered
/// with `403 Forbidden` and the connection is never registered.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let mut session = ChatSession::new(state);

    let identity = match session.authenticate(query.token.as_deref()).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!("Rejecting WebSocket upgrade: {}", e);
            return Err(StatusCode::FORBIDDEN);
        }
    };

    tracing::info!("'{}' authenticated, upgrading connection", identity.name);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, session, identity)))
}

/// Spawns a task that drains the outbound queue into the WebSocket sink.
///
/// Each frame write is bounded by `write_timeout`; a slow or broken peer ends the task,
/// which ends the session.
fn pusher_loop(
    mut rx: PusherReceiver,
    mut sender: SplitSink<WebSocket, Message>,
    write_timeout: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match tokio::time::timeout(write_timeout, sender.send(Message::Text(frame.into())))
                .await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::debug!("WebSocket write failed: {}", e);
                    break;
                }
                Err(_) => {
                    tracing::warn!("WebSocket write timed out after {:?}", write_timeout);
                    break;
                }
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, mut session: ChatSession, identity: Identity) {
    let config = session.config();
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = pusher_channel(config.outbound_capacity);

    // Writer first, so queued history starts flowing right away.
    let mut send_task = pusher_loop(rx, sender, config.write_timeout);

    if let Err(e) = session.admit(identity, tx).await {
        tracing::error!("Failed to admit connection: {}", e);
        send_task.abort();
        return;
    }

    loop {
        tokio::select! {
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let outcome = session.handle_text(text.as_str()).await;
                    tracing::debug!("Handled frame: {:?}", outcome);
                }
                Some(Ok(Message::Binary(_))) => {
                    tracing::debug!("Ignoring binary frame");
                }
                Some(Ok(Message::Close(_))) | None => break,
                // Ping/pong is handled automatically by the WebSocket protocol
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket error: {}", e);
                    break;
                }
            },
            _ = &mut send_task => break,
        }
    }

    send_task.abort();
    if let Some(name) = session.close().await {
        tracing::info!("'{}' disconnected", name);
    }
}
