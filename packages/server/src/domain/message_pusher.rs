//! MessagePusher trait 定義（Broadcast Engine の抽象）
//!
//! ドメイン層が必要とする「メッセージ通知」のインターフェースを定義します。
//! 具体的な実装（チャネル + WebSocket）は Infrastructure 層が提供します。
//!
//! ## 配送の契約
//!
//! - 1 つの宛先への配送順序は呼び出し順（宛先ごとに FIFO）
//! - broadcast は受信者ごとに失敗を隔離し、1 つの失敗で残りの配送を中断しない
//! - 再送はしない（at-most-once, best-effort）

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{entity::Connection, error::MessagePushError, event::ChatEvent};

/// Sending half of a connection's bounded outbound queue (serialized frames)
pub type PusherChannel = mpsc::Sender<String>;

/// Receiving half of a connection's outbound queue, drained by the socket writer
pub type PusherReceiver = mpsc::Receiver<String>;

/// Create a bounded outbound queue for one connection
pub fn pusher_channel(capacity: usize) -> (PusherChannel, PusherReceiver) {
    mpsc::channel(capacity.max(1))
}

/// Message pusher trait
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 特定の接続にだけイベントを送信（履歴の再送、オンライン一覧の返信）
    async fn push_to(
        &self,
        connection: &Connection,
        event: &ChatEvent,
    ) -> Result<(), MessagePushError>;

    /// 登録済みの全接続にイベントを送信
    ///
    /// 受信者ごとの失敗はログに残して握りつぶす。キューに積めた受信者の数を返す。
    async fn broadcast(&self, event: &ChatEvent) -> usize;
}
