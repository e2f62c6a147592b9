//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt};
use hiroba_server::infrastructure::dto::websocket::ServerMessage;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, protocol::Message},
};

use crate::{
    domain::{InputAction, parse_input},
    error::ClientError,
};

use super::{formatter::MessageFormatter, ui::redisplay_prompt};

/// How a session ended without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// `/quit` was entered
    Quit,
    /// Input closed (Ctrl+C / Ctrl+D)
    InputClosed,
}

/// Run one WebSocket session until the user quits or the connection drops
///
/// # Arguments
///
/// * `ws_url` - WebSocket endpoint, e.g. `ws://127.0.0.1:8080/ws`
/// * `token` - Access token obtained from `/auth/token`
/// * `username` - Own username (used to render "You")
/// * `input_rx` - Lines typed by the user
pub async fn run_client_session(
    ws_url: &str,
    token: &str,
    username: &str,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<SessionEnd, ClientError> {
    let url = format!("{}?token={}", ws_url, token);

    let (ws_stream, _response) = match connect_async(&url).await {
        Ok(result) => result,
        Err(WsError::Http(response)) if response.status().as_u16() == 403 => {
            return Err(ClientError::Forbidden);
        }
        Err(e) => return Err(ClientError::ConnectionError(e.to_string())),
    };

    tracing::info!("Connected to chat server!");
    println!(
        "\nYou are '{}'. Type messages and press Enter to send. /online lists users, /quit exits.\n",
        username
    );

    let formatter = MessageFormatter::local(username);
    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let formatted = match serde_json::from_str::<ServerMessage>(text.as_str()) {
                        Ok(message) => formatter.format(&message),
                        Err(_) => MessageFormatter::format_raw_message(text.as_str()),
                    };
                    print!("{}", formatted);
                    redisplay_prompt(username);
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Server closed the connection");
                    return Err(ClientError::ConnectionError("Connection lost".to_string()));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    return Err(ClientError::ConnectionError(e.to_string()));
                }
            },
            line = input_rx.recv() => {
                let Some(line) = line else {
                    write.send(Message::Close(None)).await.ok();
                    return Ok(SessionEnd::InputClosed);
                };
                match parse_input(&line) {
                    InputAction::Skip => {}
                    InputAction::Quit => {
                        write.send(Message::Close(None)).await.ok();
                        return Ok(SessionEnd::Quit);
                    }
                    InputAction::Send(frame) => {
                        let json = match serde_json::to_string(&frame) {
                            Ok(json) => json,
                            Err(e) => {
                                tracing::error!("Failed to serialize message: {}", e);
                                continue;
                            }
                        };
                        if let Err(e) = write.send(Message::text(json)).await {
                            tracing::warn!("Failed to send message: {}", e);
                            return Err(ClientError::ConnectionError(e.to_string()));
                        }
                    }
                }
            }
        }
    }
}
