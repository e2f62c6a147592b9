//! UseCase: トークン発行（ログイン）

use std::sync::Arc;

use crate::domain::{PasswordHasher, TokenIssuer, UserName, UserRepository};

use super::error::IssueTokenError;

pub struct IssueTokenUseCase {
    user_repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    issuer: Arc<dyn TokenIssuer>,
}

impl IssueTokenUseCase {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        issuer: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            user_repository,
            hasher,
            issuer,
        }
    }

    /// ユーザー名とパスワードを照合してアクセストークンを返す
    ///
    /// ユーザーが存在しない場合とパスワードが違う場合は区別しない。
    pub async fn execute(
        &self,
        username: String,
        password: &str,
    ) -> Result<String, IssueTokenError> {
        let name = UserName::new(username).map_err(|_| IssueTokenError::InvalidCredentials)?;
        let user = self
            .user_repository
            .find_by_name(&name)
            .await
            .map_err(|e| IssueTokenError::Storage(e.to_string()))?
            .ok_or(IssueTokenError::InvalidCredentials)?;

        if !self.hasher.verify(password, &user.password_hash) {
            tracing::warn!("Failed login attempt for '{}'", user.name);
            return Err(IssueTokenError::InvalidCredentials);
        }

        self.issuer
            .issue(&user)
            .map_err(|e| IssueTokenError::IssueFailed(e.to_string()))
    }
}
