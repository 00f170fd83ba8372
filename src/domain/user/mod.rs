//! User domain
//!
//! This module provides domain types and traits for account management,
//! including user entities, validation, and the repository trait.

mod entity;
mod repository;
mod validation;

pub use entity::{NewUser, User, UserId};
pub use repository::UserRepository;
pub use validation::{
    validate_password, validate_user_id, validate_username, UserValidationError,
};
