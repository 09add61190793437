//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] greengrocer_core::UsernameError),

    /// Invalid credentials (wrong password, unknown user, or wrong role).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Username already registered.
    #[error("username already exists")]
    DuplicateUsername,

    /// Password missing or could not be hashed.
    #[error("password error: {0}")]
    Password(#[from] greengrocer_core::PasswordError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
