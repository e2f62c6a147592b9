//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use hiroba_server::infrastructure::dto::websocket::ClientFrame;

use crate::error::ClientError;

/// What a line typed by the user means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Send a frame to the server
    Send(ClientFrame),
    /// Leave the chat
    Quit,
    /// Nothing to do (blank line)
    Skip,
}

/// Interpret one input line.
///
/// `/online` asks for the online list, `/quit` exits, anything else is chat text.
pub fn parse_input(line: &str) -> InputAction {
    match line.trim() {
        "" => InputAction::Skip,
        "/quit" | "/exit" => InputAction::Quit,
        "/online" => InputAction::Send(ClientFrame::command("online")),
        text => InputAction::Send(ClientFrame::chat(text)),
    }
}

/// Check if the client should exit immediately based on the error type.
///
/// Credential problems never fix themselves by reconnecting.
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(
        error,
        ClientError::Forbidden | ClientError::LoginFailed(_) | ClientError::RegistrationFailed(_)
    )
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    // Don't reconnect if the error requires immediate exit
    if should_exit_immediately(error) {
        return false;
    }

    // Don't reconnect if we've exhausted all attempts
    current_attempt < max_attempts
}
