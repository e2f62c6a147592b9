//! UseCase 層
//!
//! 1 つの操作につき 1 つの struct。ドメイン層の trait にだけ依存します。

pub mod authenticate;
pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod issue_token;
pub mod list_online_users;
pub mod register_user;
pub mod replay_history;
pub mod send_message;

pub use authenticate::AuthenticateUseCase;
pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, IssueTokenError, RegisterError, SendMessageError};
pub use issue_token::IssueTokenUseCase;
pub use list_online_users::ListOnlineUsersUseCase;
pub use register_user::RegisterUserUseCase;
pub use replay_history::{DEFAULT_HISTORY_LIMIT, ReplayHistoryUseCase};
pub use send_message::SendMessageUseCase;
