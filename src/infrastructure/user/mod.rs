//! User infrastructure module
//!
//! Password hashing with Argon2, the SQLite-backed repository and the
//! account management service.

mod password;
mod service;
mod sqlite_repository;

pub use password::{Argon2Hasher, PasswordHasher};
pub use service::{CreateUserRequest, UpdatePasswordRequest, UserService};
pub use sqlite_repository::SqliteUserRepository;
