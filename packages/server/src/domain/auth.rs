//! Credential seams: identity verification, token issuing and password hashing.

use async_trait::async_trait;

use super::{
    entity::{Identity, User},
    error::AuthError,
};

/// Validates an opaque token and resolves it to an [`Identity`]
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Issues tokens that an [`IdentityVerifier`] will later accept
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &User) -> Result<String, AuthError>;
}

/// One-way password hashing
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> String;

    fn verify(&self, password: &str, encoded: &str) -> bool;
}
