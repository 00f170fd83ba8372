//! User validation utilities

use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID must be a positive integer, got '{0}'")]
    InvalidId(String),

    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error("Username exceeds maximum length of {0} characters")]
    UsernameTooLong(usize),

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),
}

const MAX_USERNAME_LENGTH: usize = 64;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Validate a raw user ID
///
/// Rules:
/// - Must parse as an integer
/// - Must be greater than zero
pub fn validate_user_id(raw: &str) -> Result<i64, UserValidationError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(UserValidationError::InvalidId(raw.to_string())),
    }
}

/// Validate a username
///
/// Rules:
/// - Cannot be empty
/// - Maximum 64 characters
pub fn validate_username(username: &str) -> Result<(), UserValidationError> {
    if username.is_empty() {
        return Err(UserValidationError::EmptyUsername);
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(UserValidationError::UsernameTooLong(MAX_USERNAME_LENGTH));
    }

    Ok(())
}

/// Validate a password
///
/// Rules:
/// - Cannot be empty
/// - Maximum 128 characters
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.is_empty() {
        return Err(UserValidationError::EmptyPassword);
    }

    if password.chars().count() > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}
