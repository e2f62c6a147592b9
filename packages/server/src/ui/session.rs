//! Session Handler: one chat connection from upgrade to teardown.
//!
//! ```text
//! Connecting → Authenticating → Admitted → Active → Closing → Closed
//!                    │              │
//!                    └──────────────┴──────────────→ Closed (rejected)
//! ```
//!
//! The transport (WebSocket split, writer task) lives in `handler/websocket.rs`;
//! this type only drives the usecases so every transition can be tested without a socket.

use std::sync::Arc;

use crate::{
    domain::{AuthError, ClientRequest, Connection, Identity, PusherChannel, UserName},
    infrastructure::dto::websocket::ClientFrame,
    ui::state::{AppState, SessionConfig},
    usecase::{ConnectError, SendMessageError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Authenticating,
    Admitted,
    Active,
    Closing,
    Closed,
}

/// What the receive loop did with one inbound text frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Not a JSON object of the expected shape; ignored
    Malformed,
    /// Well-formed but nothing to act on, or the session is not active
    Ignored,
    /// Online list sent privately to this connection
    OnlineUsersSent,
    /// Private reply could not be queued
    ReplyFailed,
    /// Message stored and broadcast to this many recipients
    Broadcast(usize),
    /// Blank message dropped without storing
    Dropped,
    /// Store write failed; message dropped
    StoreFailed,
}

pub struct ChatSession {
    app: Arc<AppState>,
    state: SessionState,
    connection: Option<Connection>,
}

impl ChatSession {
    pub fn new(app: Arc<AppState>) -> Self {
        Self {
            app,
            state: SessionState::Connecting,
            connection: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    pub fn config(&self) -> SessionConfig {
        self.app.session_config
    }

    /// Identity gate. On failure the session is closed and must not be admitted.
    pub async fn authenticate(&mut self, token: Option<&str>) -> Result<Identity, AuthError> {
        self.state = SessionState::Authenticating;
        match self.app.authenticate_usecase.execute(token).await {
            Ok(identity) => Ok(identity),
            Err(e) => {
                self.state = SessionState::Closed;
                Err(e)
            }
        }
    }

    /// Replay history privately, register, then announce the join.
    pub async fn admit(
        &mut self,
        identity: Identity,
        sender: PusherChannel,
    ) -> Result<(), ConnectError> {
        self.state = SessionState::Admitted;

        // Loaded before the connection becomes visible to broadcasts. A message stored and
        // broadcast between this load and registration reaches this connection neither way.
        let backlog = self.app.replay_history_usecase.execute().await;
        let connection = Connection::new(identity, sender);

        match self
            .app
            .connect_participant_usecase
            .execute(connection.clone(), backlog)
            .await
        {
            Ok(notified) => {
                tracing::info!(
                    "'{}' joined as connection {} ({} notified)",
                    connection.user_name(),
                    connection.id,
                    notified
                );
                self.connection = Some(connection);
                self.state = SessionState::Active;
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Closed;
                Err(e)
            }
        }
    }

    /// Dispatch one inbound text frame.
    pub async fn handle_text(&self, text: &str) -> FrameOutcome {
        let Some(connection) = self
            .connection
            .as_ref()
            .filter(|_| self.state == SessionState::Active)
        else {
            return FrameOutcome::Ignored;
        };

        let frame = match ClientFrame::parse(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(
                    "Ignoring malformed frame from '{}': {}",
                    connection.user_name(),
                    e
                );
                return FrameOutcome::Malformed;
            }
        };

        match ClientRequest::from(frame) {
            ClientRequest::OnlineUsers => {
                match self.app.list_online_users_usecase.execute(connection).await {
                    Ok(()) => FrameOutcome::OnlineUsersSent,
                    Err(e) => {
                        tracing::warn!("Failed to reply online users: {}", e);
                        FrameOutcome::ReplyFailed
                    }
                }
            }
            ClientRequest::Chat(text) => {
                match self
                    .app
                    .send_message_usecase
                    .execute(&connection.identity, text)
                    .await
                {
                    Ok(delivered) => FrameOutcome::Broadcast(delivered),
                    Err(SendMessageError::EmptyMessage) => FrameOutcome::Dropped,
                    Err(e @ SendMessageError::StoreWriteFailure(_)) => {
                        tracing::error!(
                            "Dropping message from '{}': {}",
                            connection.user_name(),
                            e
                        );
                        FrameOutcome::StoreFailed
                    }
                }
            }
            ClientRequest::Unrecognized => {
                tracing::debug!("Ignoring frame without content or known command");
                FrameOutcome::Ignored
            }
        }
    }

    /// Teardown. Runs at most once; later calls return `None`.
    pub async fn close(&mut self) -> Option<UserName> {
        if self.state == SessionState::Closed {
            return None;
        }
        self.state = SessionState::Closing;

        let left = match self.connection.take() {
            Some(connection) => {
                self.app
                    .disconnect_participant_usecase
                    .execute(&connection.id)
                    .await
            }
            None => None,
        };

        self.state = SessionState::Closed;
        left
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration};
    use hiroba_shared::time::SystemClock;

    use super::*;
    use crate::{
        domain::{
            ConnectionRegistry, MessageContent, PusherReceiver, RepositoryError, StoredMessage,
            Timestamp, UserId, UserRepository, auth::MockIdentityVerifier, pusher_channel,
            repository::MockMessageLog,
        },
        infrastructure::{
            auth::{JwtAuthority, Sha256PasswordHasher},
            dto::websocket::ServerMessage,
            message_pusher::WebSocketMessagePusher,
            repository::InMemoryUserRepository,
        },
        ui::state::Collaborators,
    };

    struct Fixture {
        app: Arc<AppState>,
        registry: Arc<ConnectionRegistry>,
    }

    fn identity(id: i64, name: &str) -> Identity {
        Identity::new(UserId::new(id), UserName::new(name.to_string()).unwrap())
    }

    fn stamp(millis: i64) -> Timestamp {
        Timestamp::new(DateTime::from_timestamp_millis(millis).unwrap())
    }

    /// 既定のモック: 履歴は空、トークン "alice"/"bob" を受け付ける
    fn default_log() -> MockMessageLog {
        let mut log = MockMessageLog::new();
        log.expect_recent().returning(|_| Ok(Vec::new()));
        log
    }

    fn create_fixture(log: MockMessageLog) -> Fixture {
        let mut verifier = MockIdentityVerifier::new();
        verifier.expect_verify().returning(|token| match token {
            "alice" => Ok(identity(1, "alice")),
            "bob" => Ok(identity(2, "bob")),
            other => Err(AuthError::InvalidToken(other.to_string())),
        });

        let registry = Arc::new(ConnectionRegistry::new());
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let collaborators = Collaborators {
            registry: registry.clone(),
            message_pusher: Arc::new(WebSocketMessagePusher::new(registry.clone())),
            user_repository: users.clone(),
            message_log: Arc::new(log),
            identity_verifier: Arc::new(verifier),
            token_issuer: Arc::new(JwtAuthority::new(
                b"secret",
                Duration::minutes(30),
                users,
                Arc::new(SystemClock),
            )),
            password_hasher: Arc::new(Sha256PasswordHasher::new(4)),
        };
        let app = Arc::new(AppState::new(collaborators, 50, SessionConfig::default()));
        Fixture { app, registry }
    }

    async fn admitted(fixture: &Fixture, token: &str) -> (ChatSession, PusherReceiver) {
        let mut session = ChatSession::new(fixture.app.clone());
        let identity = session.authenticate(Some(token)).await.unwrap();
        let (tx, rx) = pusher_channel(64);
        session.admit(identity, tx).await.unwrap();
        (session, rx)
    }

    fn drain(rx: &mut PusherReceiver) -> Vec<ServerMessage> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    fn system(content: &str) -> ServerMessage {
        ServerMessage::System {
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_session_transitions() {
        // テスト項目: 認証・入室・切断で状態が Connecting → Active → Closed と遷移する
        // given (前提条件):
        let fixture = create_fixture(default_log());
        let mut session = ChatSession::new(fixture.app.clone());
        assert_eq!(session.state(), SessionState::Connecting);

        // when (操作):
        let identity = session.authenticate(Some("alice")).await.unwrap();
        let after_auth = session.state();
        let (tx, _rx) = pusher_channel(8);
        session.admit(identity, tx).await.unwrap();
        let after_admit = session.state();
        session.close().await;

        // then (期待する結果):
        assert_eq!(after_auth, SessionState::Authenticating);
        assert_eq!(after_admit, SessionState::Active);
        assert_eq!(session.state(), SessionState::Closed);
        assert!(fixture.registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_session_rejected_token_never_registered() {
        // テスト項目: 無効なトークンの接続は Closed になり、登録されない
        // given (前提条件):
        let fixture = create_fixture(default_log());
        let mut session = ChatSession::new(fixture.app.clone());

        // when (操作):
        let result = session.authenticate(Some("forged")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
        assert_eq!(session.state(), SessionState::Closed);
        assert!(fixture.registry.list_usernames().await.is_empty());
        assert_eq!(session.close().await, None);
    }

    #[tokio::test]
    async fn test_session_history_then_join_notice() {
        // テスト項目: 入室時に履歴が古い順に届き、その後に本人の入室通知が届く
        // given (前提条件):
        let mut log = MockMessageLog::new();
        log.expect_recent().withf(|limit| *limit == 50).returning(|_| {
            Ok(vec![
                StoredMessage {
                    id: 1,
                    author_id: UserId::new(99),
                    content: MessageContent::new("old".to_string()).unwrap(),
                    timestamp: stamp(1_000),
                },
                StoredMessage {
                    id: 2,
                    author_id: UserId::new(99),
                    content: MessageContent::new("new".to_string()).unwrap(),
                    timestamp: stamp(2_000),
                },
            ])
        });
        let fixture = create_fixture(log);

        // when (操作):
        let (_session, mut rx) = admitted(&fixture, "alice").await;

        // then (期待する結果):
        let frames = drain(&mut rx);
        assert_eq!(
            frames,
            vec![
                ServerMessage::Message {
                    username: "Unknown".to_string(),
                    content: "old".to_string(),
                    timestamp: "1970-01-01T00:00:01.000Z".to_string(),
                },
                ServerMessage::Message {
                    username: "Unknown".to_string(),
                    content: "new".to_string(),
                    timestamp: "1970-01-01T00:00:02.000Z".to_string(),
                },
                system("alice joined the chat."),
            ]
        );
    }

    #[tokio::test]
    async fn test_online_command_is_private_and_not_stored() {
        // テスト項目: {"command":"online"} は保存もブロードキャストもされず、本人にだけ返信される
        // given (前提条件):
        let mut log = default_log();
        log.expect_append().times(0);
        let fixture = create_fixture(log);
        let (alice, mut alice_rx) = admitted(&fixture, "alice").await;
        let (_bob, mut bob_rx) = admitted(&fixture, "bob").await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        // when (操作):
        let outcome = alice.handle_text(r#"{"command": "online"}"#).await;

        // then (期待する結果):
        assert_eq!(outcome, FrameOutcome::OnlineUsersSent);
        assert_eq!(drain(&mut alice_rx), vec![system("Online users: alice, bob")]);
        assert!(drain(&mut bob_rx).is_empty());
    }

    #[tokio::test]
    async fn test_content_is_stored_once_and_broadcast_once() {
        // テスト項目: {"content":"hi"} はちょうど 1 回保存され、1 回ブロードキャストされる
        // given (前提条件):
        let mut log = default_log();
        log.expect_append()
            .withf(|author, content| *author == UserId::new(1) && content.as_str() == "hi")
            .times(1)
            .returning(|_, _| Ok(stamp(5_000)));
        let fixture = create_fixture(log);
        let (alice, mut alice_rx) = admitted(&fixture, "alice").await;
        let (_bob, mut bob_rx) = admitted(&fixture, "bob").await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        // when (操作):
        let outcome = alice.handle_text(r#"{"content": "hi"}"#).await;

        // then (期待する結果):
        assert_eq!(outcome, FrameOutcome::Broadcast(2));
        let expected = ServerMessage::Message {
            username: "alice".to_string(),
            content: "hi".to_string(),
            timestamp: "1970-01-01T00:00:05.000Z".to_string(),
        };
        assert_eq!(drain(&mut alice_rx), vec![expected.clone()]);
        assert_eq!(drain(&mut bob_rx), vec![expected]);
    }

    #[tokio::test]
    async fn test_empty_content_is_dropped() {
        // テスト項目: 空のメッセージは保存もブロードキャストもされない
        // given (前提条件):
        let mut log = default_log();
        log.expect_append().times(0);
        let fixture = create_fixture(log);
        let (alice, mut alice_rx) = admitted(&fixture, "alice").await;
        drain(&mut alice_rx);

        // when (操作):
        let empty = alice.handle_text(r#"{"content": ""}"#).await;
        let blank = alice.handle_text(r#"{"content": "   "}"#).await;

        // then (期待する結果):
        assert_eq!(empty, FrameOutcome::Dropped);
        assert_eq!(blank, FrameOutcome::Dropped);
        assert!(drain(&mut alice_rx).is_empty());
    }

    #[tokio::test]
    async fn test_malformed_and_unknown_frames_are_ignored() {
        // テスト項目: 不正なフレーム・未知のコマンドは無視され、セッションは継続する
        // given (前提条件):
        let mut log = default_log();
        log.expect_append().times(0);
        let fixture = create_fixture(log);
        let (alice, mut alice_rx) = admitted(&fixture, "alice").await;
        drain(&mut alice_rx);

        // when (操作):
        let not_json = alice.handle_text("hello").await;
        let wrong_shape = alice.handle_text(r#"{"content": 42}"#).await;
        let unknown_command = alice.handle_text(r#"{"command": "dance"}"#).await;

        // then (期待する結果):
        assert_eq!(not_json, FrameOutcome::Malformed);
        assert_eq!(wrong_shape, FrameOutcome::Malformed);
        assert_eq!(unknown_command, FrameOutcome::Ignored);
        assert_eq!(alice.state(), SessionState::Active);
        assert!(drain(&mut alice_rx).is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_drops_message() {
        // テスト項目: 保存に失敗したメッセージは配信されず、セッションは継続する
        // given (前提条件):
        let mut log = default_log();
        log.expect_append()
            .returning(|_, _| Err(RepositoryError::Storage("disk full".to_string())));
        let fixture = create_fixture(log);
        let (alice, mut alice_rx) = admitted(&fixture, "alice").await;
        drain(&mut alice_rx);

        // when (操作):
        let outcome = alice.handle_text(r#"{"content": "hi"}"#).await;

        // then (期待する結果):
        assert_eq!(outcome, FrameOutcome::StoreFailed);
        assert_eq!(alice.state(), SessionState::Active);
        assert!(drain(&mut alice_rx).is_empty());
    }

    #[tokio::test]
    async fn test_close_twice_emits_one_left_notice() {
        // テスト項目: close を 2 回呼んでも退室通知は 1 回だけで、登録状態も変わらない
        // given (前提条件):
        let fixture = create_fixture(default_log());
        let (mut alice, _alice_rx) = admitted(&fixture, "alice").await;
        let (_bob, mut bob_rx) = admitted(&fixture, "bob").await;
        drain(&mut bob_rx);

        // when (操作):
        let first = alice.close().await;
        let names_after_first = fixture.registry.list_usernames().await;
        let second = alice.close().await;

        // then (期待する結果):
        assert_eq!(first.map(UserName::into_string), Some("alice".to_string()));
        assert_eq!(second, None);
        assert_eq!(fixture.registry.list_usernames().await, names_after_first);
        assert_eq!(drain(&mut bob_rx), vec![system("alice left the chat.")]);
    }
}
