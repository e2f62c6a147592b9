//! UseCase: オンラインユーザー一覧
//!
//! `{"command": "online"}` への返信は本人にだけ送ります。保存もブロードキャストもしません。

use std::sync::Arc;

use crate::domain::{
    ChatEvent, Connection, ConnectionRegistry, MessagePushError, MessagePusher, UserName,
};

pub struct ListOnlineUsersUseCase {
    registry: Arc<ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ListOnlineUsersUseCase {
    pub fn new(registry: Arc<ConnectionRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 登録順のユーザー名（同じユーザーの複数接続は重複して含まれる）
    pub async fn usernames(&self) -> Vec<UserName> {
        self.registry.list_usernames().await
    }

    /// 一覧を要求した接続にだけ返信する
    pub async fn execute(&self, requester: &Connection) -> Result<(), MessagePushError> {
        let names = self.usernames().await;
        self.message_pusher
            .push_to(requester, &ChatEvent::online_users(&names))
            .await
    }
}
