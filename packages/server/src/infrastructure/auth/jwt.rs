//! JWT (HS256) token issuing and verification.
//!
//! Claims carry the username in `sub`; verification resolves the user through the
//! [`UserRepository`] so tokens of deleted users stop working.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use hiroba_shared::time::Clock;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::{
    AuthError, Identity, IdentityVerifier, TokenIssuer, User, UserName, UserRepository,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    /// Numeric user id at issue time
    pub uid: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Generate a random 256-bit signing secret.
pub fn generate_secret() -> Vec<u8> {
    let key: [u8; 32] = rand::thread_rng().r#gen();
    key.to_vec()
}

pub struct JwtAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl JwtAuthority {
    pub fn new(
        secret: &[u8],
        token_ttl: Duration,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl,
            users,
            clock,
        }
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock below.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        if claims.exp <= self.clock.now().timestamp() {
            return Err(AuthError::ExpiredToken);
        }
        Ok(claims)
    }
}

impl TokenIssuer for JwtAuthority {
    fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(self.token_ttl)
            .ok_or_else(|| AuthError::IssueFailed("token expiry out of range".to_string()))?;
        let claims = Claims {
            sub: user.name.as_str().to_string(),
            uid: user.id.value(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::IssueFailed(e.to_string()))
    }
}

#[async_trait]
impl IdentityVerifier for JwtAuthority {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.decode_claims(token)?;
        let name = UserName::new(claims.sub.clone())
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let user = self
            .users
            .find_by_name(&name)
            .await?
            .ok_or(AuthError::UnknownUser(claims.sub))?;
        Ok(user.identity())
    }
}
