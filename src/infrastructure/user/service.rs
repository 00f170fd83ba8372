//! User service for account management

use std::sync::Arc;

use tracing::info;

use crate::domain::user::{
    validate_password, validate_username, NewUser, User, UserId, UserRepository,
};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Request for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
}

/// Request for changing a password while logged in
#[derive(Debug, Clone)]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Signup, login and account lifecycle on top of a user repository
#[derive(Debug, Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }

    /// Register a new account
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        validate_username(&request.username).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password).map_err(|e| DomainError::validation(e.to_string()))?;

        if self.repository.username_exists(&request.username).await? {
            return Err(DomainError::conflict("Username already exists"));
        }

        let password_hash = self.hasher.hash(&request.password)?;

        let user = self
            .repository
            .create(NewUser {
                username: request.username,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id(), "User registered");

        Ok(user)
    }

    /// Check credentials; unknown users and wrong passwords fail alike
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let user = self
            .repository
            .get_by_username(username)
            .await?
            .filter(|user| self.hasher.verify(password, user.password_hash()))
            .ok_or_else(|| DomainError::auth("Invalid credentials"))?;

        Ok(user)
    }

    /// Number of registered accounts
    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }

    /// Change a password after verifying the current one
    pub async fn update_password(
        &self,
        id: UserId,
        request: UpdatePasswordRequest,
    ) -> Result<User, DomainError> {
        let mut user = self.require(id).await?;

        if !self.hasher.verify(&request.current_password, user.password_hash()) {
            return Err(DomainError::auth("Current password is incorrect"));
        }

        validate_password(&request.new_password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        user.set_password_hash(self.hasher.hash(&request.new_password)?);

        self.repository.update(&user).await
    }

    /// Set a new password for a username without checking the old one
    pub async fn reset_password(
        &self,
        username: &str,
        new_password: &str,
    ) -> Result<User, DomainError> {
        validate_password(new_password).map_err(|e| DomainError::validation(e.to_string()))?;

        let mut user = self
            .repository
            .get_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))?;

        user.set_password_hash(self.hasher.hash(new_password)?);

        self.repository.update(&user).await
    }

    /// Delete an account and its prediction history after a password check
    pub async fn delete(&self, id: UserId, password: &str) -> Result<(), DomainError> {
        let user = self.require(id).await?;

        if !self.hasher.verify(password, user.password_hash()) {
            return Err(DomainError::auth("Incorrect password"));
        }

        if !self.repository.delete(id).await? {
            return Err(DomainError::not_found("User not found"));
        }

        info!(user_id = %id, "Account deleted");

        Ok(())
    }

    async fn require(&self, id: UserId) -> Result<User, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))
    }
}
