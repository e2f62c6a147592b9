//! UI 層: axum のルーター、HTTP / WebSocket ハンドラー、接続ごとのセッション

mod handler;
mod server;
pub mod session;
mod signal;
pub mod state; // bin と結合テストから組み立てるため public

pub use server::Server;
pub use session::{ChatSession, FrameOutcome, SessionState};
pub use state::{AppState, SessionConfig};
