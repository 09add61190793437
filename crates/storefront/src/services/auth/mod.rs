//! Authentication service.
//!
//! Provides password registration and login for both credential pools
//! (customers and admins), plus the idempotent admin bootstrap.

mod error;

pub use error::AuthError;

use sqlx::SqlitePool;

use greengrocer_core::{PasswordDigest, Role, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::{Principal, User};

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new customer account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` if the username is malformed.
    /// Returns `AuthError::Password` if the password is empty.
    /// Returns `AuthError::DuplicateUsername` if the username is taken.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        self.create_account(username, password, Role::Customer).await
    }

    /// Verify credentials against the pool for `role`.
    ///
    /// An admin username never authenticates as a customer and vice versa.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if no account with this username
    /// and role exists or the password does not match.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<Principal, AuthError> {
        let Ok(username) = Username::parse(username) else {
            return Err(AuthError::InvalidCredentials);
        };

        let (user, digest) = self
            .users
            .get_by_username_and_role(&username, role)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !digest.verify(password) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Principal {
            user_id: user.id,
            username: user.username,
            role: user.role,
        })
    }

    /// Create the admin account unless one already exists.
    ///
    /// Returns whether an admin was created. Calling this repeatedly never
    /// produces a second admin.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::DuplicateUsername` if the username belongs to a
    /// customer account.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        if self.users.any_admin_exists().await? {
            return Ok(false);
        }

        let admin = self.create_account(username, password, Role::Admin).await?;
        tracing::info!(user_id = %admin.id, username = %admin.username, "Admin account created");

        Ok(true)
    }

    async fn create_account(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        let digest = PasswordDigest::hash(password)?;

        self.users
            .create(&username, &digest, role)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateUsername,
                other => AuthError::Repository(other),
            })
    }
}
