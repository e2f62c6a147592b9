//! UseCase: ユーザー登録

use std::sync::Arc;

use crate::domain::{PasswordHasher, User, UserName, UserRepository};

use super::error::RegisterError;

pub struct RegisterUserUseCase {
    user_repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl RegisterUserUseCase {
    pub fn new(user_repository: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            user_repository,
            hasher,
        }
    }

    pub async fn execute(&self, username: String, password: &str) -> Result<User, RegisterError> {
        let name = UserName::new(username)?;
        if password.is_empty() {
            return Err(RegisterError::EmptyPassword);
        }
        let password_hash = self.hasher.hash(password);
        let user = self.user_repository.create(name, password_hash).await?;
        tracing::info!("Registered user '{}' (id: {})", user.name, user.id);
        Ok(user)
    }
}
