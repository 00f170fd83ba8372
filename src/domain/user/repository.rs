//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{NewUser, User, UserId};
use crate::domain::DomainError;

/// Repository trait for user storage
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by their ID
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by their username (for login)
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Insert a user; fails with `Conflict` when the username is taken
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// Persist a changed password hash
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Remove a user together with all of their prediction records.
    ///
    /// Both deletions happen atomically. Returns `false` when no such user exists.
    async fn delete(&self, id: UserId) -> Result<bool, DomainError>;

    /// Count registered users
    async fn count(&self) -> Result<usize, DomainError>;

    /// Check if a user ID exists
    async fn exists(&self, id: UserId) -> Result<bool, DomainError> {
        Ok(self.get(id).await?.is_some())
    }

    /// Check if a username exists
    async fn username_exists(&self, username: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_username(username).await?.is_some())
    }
}
