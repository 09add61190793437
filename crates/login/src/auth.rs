//! Registration and credential checks for the demo.

use sqlx::SqlitePool;
use thiserror::Error;

use greengrocer_core::{PasswordDigest, PasswordError, Username, UsernameError};

use crate::db::{Account, AccountRepository, RepositoryError};

/// Errors from registration and login.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    #[error("username already exists")]
    DuplicateUsername,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AuthError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict => Self::DuplicateUsername,
            other => Self::Repository(other),
        }
    }
}

/// Account service scoped to one request.
pub struct AuthService<'a> {
    accounts: AccountRepository<'a>,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            accounts: AccountRepository::new(pool),
        }
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUsername` or `Password` for bad input and
    /// `DuplicateUsername` if the name is taken.
    pub async fn register(&self, username: &str, password: &str) -> Result<Account, AuthError> {
        let username = Username::parse(username)?;
        let digest = PasswordDigest::hash(password)?;

        let account = self.accounts.create(&username, &digest).await?;
        tracing::info!(user_id = %account.id, "Account registered");
        Ok(account)
    }

    /// Verify a username/password pair.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for an unknown user or a wrong password.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Account, AuthError> {
        let Ok(username) = Username::parse(username) else {
            return Err(AuthError::InvalidCredentials);
        };

        match self.accounts.get_with_hash(&username).await? {
            Some((account, digest)) if digest.verify(password) => Ok(account),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db;

    async fn pool() -> SqlitePool {
        let pool = db::create_memory_pool().await.unwrap();
        db::migrate(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let pool = pool().await;
        let auth = AuthService::new(&pool);

        let account = auth.register("bob", "hunter2").await.unwrap();
        let logged_in = auth.authenticate("bob", "hunter2").await.unwrap();
        assert_eq!(account.id, logged_in.id);
        assert_eq!(logged_in.username.as_str(), "bob");
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user() {
        let pool = pool().await;
        let auth = AuthService::new(&pool);
        auth.register("bob", "hunter2").await.unwrap();

        assert!(matches!(
            auth.authenticate("bob", "hunter3").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.authenticate("carol", "hunter2").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.authenticate("", "hunter2").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let pool = pool().await;
        let auth = AuthService::new(&pool);
        auth.register("bob", "hunter2").await.unwrap();

        assert!(matches!(
            auth.register("bob", "other").await,
            Err(AuthError::DuplicateUsername)
        ));
        assert_eq!(AccountRepository::new(&pool).count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rejects_empty_input() {
        let pool = pool().await;
        let auth = AuthService::new(&pool);

        assert!(matches!(
            auth.register("  ", "pw").await,
            Err(AuthError::InvalidUsername(_))
        ));
        assert!(matches!(
            auth.register("bob", "").await,
            Err(AuthError::Password(_))
        ));
    }
}
