//! Request handlers.

mod http;
mod websocket;

pub use http::{health_check, issue_token, online_users, register, welcome};
pub use websocket::websocket_handler;
