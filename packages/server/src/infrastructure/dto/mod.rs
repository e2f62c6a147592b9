//! Data Transfer Objects (DTOs) for the chat application.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket frame DTOs (shared with the terminal client)
//! - `http`: HTTP API request/response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
