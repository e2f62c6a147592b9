//! メッセージ送信（通知）の実装
//!
//! ## 実装
//!
//! - `websocket`: 接続ごとの送信キュー（WebSocket writer が消費）を使った実装

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
