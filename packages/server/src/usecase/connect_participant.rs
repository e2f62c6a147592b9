//! UseCase: 参加者接続処理
//!
//! ## 処理順序
//!
//! 1. 履歴を新しい接続のキューにだけ積む
//! 2. ConnectionRegistry に登録する
//! 3. 入室通知をブロードキャストする（本人にも届く）
//!
//! 登録より前に履歴を積むため、ライブのブロードキャストが履歴を追い越すことはありません。
//!
//! ## 既知のすき間
//!
//! 履歴は登録より前に読み込むため、読み込み後から登録までの間に保存・ブロードキャストされた
//! メッセージは、履歴にもライブ配信にも含まれずこの接続には届きません。
//! 欠落はこの短い区間に限られ、順序（履歴がライブより先）は崩れません。

use std::sync::Arc;

use crate::domain::{ChatEvent, Connection, ConnectionRegistry, MessagePusher};

use super::error::ConnectError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// 接続中のクライアント
    registry: Arc<ConnectionRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectParticipantUseCase {
    pub fn new(registry: Arc<ConnectionRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 参加者接続を実行
    ///
    /// # Arguments
    ///
    /// * `connection` - 認証済みの接続（送信キュー付き）
    /// * `backlog` - 登録前に本人へ送る履歴（古い順）
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 入室通知を積めた受信者数
    /// * `Err(ConnectError)` - 履歴を積めなかった、または登録済みの接続
    pub async fn execute(
        &self,
        connection: Connection,
        backlog: Vec<ChatEvent>,
    ) -> Result<usize, ConnectError> {
        // 1. 履歴の再送（本人のみ）
        for event in &backlog {
            self.message_pusher.push_to(&connection, event).await?;
        }
        tracing::debug!(
            "Replayed {} history message(s) to '{}'",
            backlog.len(),
            connection.user_name()
        );

        // 2. 登録
        let joined = ChatEvent::joined(connection.user_name());
        self.registry.add(connection).await?;

        // 3. 入室通知
        Ok(self.message_pusher.broadcast(&joined).await)
    }
}
