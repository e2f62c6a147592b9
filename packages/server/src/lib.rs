//! Hiroba chat server: a single-room real-time chat over WebSocket.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
