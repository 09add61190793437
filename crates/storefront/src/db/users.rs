//! User repository for database operations.
//!
//! Queries are checked at runtime and decoded into `FromRow` row types, which
//! are then validated into domain types.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use greengrocer_core::{PasswordDigest, Role, UserId, Username};

use super::{RepositoryError, conflict_on_unique};
use crate::models::User;

/// Raw `users` row.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    is_admin: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username,
            role: Role::from_admin_flag(row.is_admin),
            created_at: row.created_at,
        })
    }
}

/// Raw `users` row including the password hash.
#[derive(Debug, sqlx::FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &Username,
        password_hash: &PasswordDigest,
        role: Role,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (username, password_hash, is_admin)
            VALUES (?, ?, ?)
            RETURNING id, username, is_admin, created_at
            ",
        )
        .bind(username)
        .bind(password_hash.as_str())
        .bind(role.is_admin())
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "username"))?;

        row.try_into()
    }

    /// Get a user and password hash by username, restricted to one role.
    ///
    /// The role filter keeps the admin and customer credential pools disjoint.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored username is invalid.
    pub async fn get_by_username_and_role(
        &self,
        username: &Username,
        role: Role,
    ) -> Result<Option<(User, PasswordDigest)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHashRow>(
            r"
            SELECT id, username, is_admin, created_at, password_hash
            FROM users
            WHERE username = ? AND is_admin = ?
            ",
        )
        .bind(username)
        .bind(role.is_admin())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| {
            let hash = PasswordDigest::from_phc(r.password_hash);
            User::try_from(r.user).map(|user| (user, hash))
        })
        .transpose()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored username is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, is_admin, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// List every account in creation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, is_admin, created_at FROM users ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Whether any admin account exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn any_admin_exists(&self) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE is_admin = TRUE)")
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Count admin accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_admins(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_admin = TRUE")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}
