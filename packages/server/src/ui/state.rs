//! Shared application state.

use std::{sync::Arc, time::Duration};

use crate::domain::{
    ConnectionRegistry, IdentityVerifier, MessageLog, MessagePusher, PasswordHasher, TokenIssuer,
    UserRepository,
};
use crate::usecase::{
    AuthenticateUseCase, ConnectParticipantUseCase, DisconnectParticipantUseCase,
    IssueTokenUseCase, ListOnlineUsersUseCase, RegisterUserUseCase, ReplayHistoryUseCase,
    SendMessageUseCase,
};

/// Per-connection transport settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// 送信キューの容量（履歴の件数以上であること）
    pub outbound_capacity: usize,
    /// 1 フレームあたりの書き込みタイムアウト
    pub write_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: 256,
            write_timeout: Duration::from_millis(2000),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub authenticate_usecase: Arc<AuthenticateUseCase>,
    pub replay_history_usecase: Arc<ReplayHistoryUseCase>,
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub list_online_users_usecase: Arc<ListOnlineUsersUseCase>,
    pub register_user_usecase: Arc<RegisterUserUseCase>,
    pub issue_token_usecase: Arc<IssueTokenUseCase>,
    pub session_config: SessionConfig,
}

/// Collaborators the usecases are wired from
pub struct Collaborators {
    pub registry: Arc<ConnectionRegistry>,
    pub message_pusher: Arc<dyn MessagePusher>,
    pub user_repository: Arc<dyn UserRepository>,
    pub message_log: Arc<dyn MessageLog>,
    pub identity_verifier: Arc<dyn IdentityVerifier>,
    pub token_issuer: Arc<dyn TokenIssuer>,
    pub password_hasher: Arc<dyn PasswordHasher>,
}

impl AppState {
    /// Build every usecase from the given collaborators
    pub fn new(
        collaborators: Collaborators,
        history_limit: usize,
        session_config: SessionConfig,
    ) -> Self {
        let Collaborators {
            registry,
            message_pusher,
            user_repository,
            message_log,
            identity_verifier,
            token_issuer,
            password_hasher,
        } = collaborators;

        Self {
            authenticate_usecase: Arc::new(AuthenticateUseCase::new(identity_verifier)),
            replay_history_usecase: Arc::new(ReplayHistoryUseCase::new(
                message_log.clone(),
                user_repository.clone(),
                history_limit,
            )),
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                registry.clone(),
                message_pusher.clone(),
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                registry.clone(),
                message_pusher.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                message_log,
                message_pusher.clone(),
            )),
            list_online_users_usecase: Arc::new(ListOnlineUsersUseCase::new(
                registry,
                message_pusher,
            )),
            register_user_usecase: Arc::new(RegisterUserUseCase::new(
                user_repository.clone(),
                password_hasher.clone(),
            )),
            issue_token_usecase: Arc::new(IssueTokenUseCase::new(
                user_repository,
                password_hasher,
                token_issuer,
            )),
            session_config,
        }
    }
}
