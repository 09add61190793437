//! Database operations for the login demo `SQLite` database.
//!
//! ## Tables
//!
//! - `users` - Demo accounts (username + Argon2 hash)
//! - `tower_sessions` - Session storage (created by the session store)

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

use greengrocer_core::{PasswordDigest, UserId, Username};

/// Embedded login demo migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Username already taken.
    #[error("username already exists")]
    Conflict,
}

/// A demo account.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: UserId,
    pub username: Username,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: i64,
    username: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AccountWithHashRow {
    #[sqlx(flatten)]
    account: AccountRow,
    password_hash: String,
}

/// Repository for demo accounts.
pub struct AccountRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AccountRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    pub async fn create(
        &self,
        username: &Username,
        password_hash: &PasswordDigest,
    ) -> Result<Account, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            INSERT INTO users (username, password_hash)
            VALUES (?, ?)
            RETURNING id, username, created_at
            ",
        )
        .bind(username)
        .bind(password_hash.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                RepositoryError::Conflict
            }
            other => RepositoryError::Database(other),
        })?;

        row.try_into()
    }

    /// Look up an account and its password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(Account, PasswordDigest)>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountWithHashRow>(
            r"
            SELECT id, username, created_at, password_hash
            FROM users
            WHERE username = ?
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| {
            let hash = PasswordDigest::from_phc(r.password_hash);
            Account::try_from(r.account).map(|account| (account, hash))
        })
        .transpose()
    }

    /// Number of registered accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?)
    }
}

/// Create a `SQLite` connection pool, creating the file if missing.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Create a private single-connection in-memory pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
        .await
}

/// Apply all pending login demo migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails.
pub async fn migrate(pool: &SqlitePool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}
