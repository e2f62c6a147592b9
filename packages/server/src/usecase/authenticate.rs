//! UseCase: 認証ゲート
//!
//! 接続を受け入れる前に、提示されたトークンを検証して Identity を解決します。
//! 失敗した場合、呼び出し側（UI 層）はアップグレードを 403 で拒否します。

use std::sync::Arc;

use crate::domain::{AuthError, Identity, IdentityVerifier};

pub struct AuthenticateUseCase {
    verifier: Arc<dyn IdentityVerifier>,
}

impl AuthenticateUseCase {
    pub fn new(verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self { verifier }
    }

    /// トークンを検証する
    ///
    /// トークンが無い・空の場合は検証器を呼ばずに `AuthError::MissingToken` を返す。
    pub async fn execute(&self, token: Option<&str>) -> Result<Identity, AuthError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;
        self.verifier.verify(token).await
    }
}
