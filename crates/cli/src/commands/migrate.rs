//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - storefront `SQLite` URL (falls back to
//!   `DATABASE_URL`, then `sqlite://greengrocer.db`)
//! - `LOGIN_DATABASE_URL` - login demo `SQLite` URL (default `sqlite://users.db`)
//!
//! Migrations are embedded from `crates/storefront/migrations/` and
//! `crates/login/migrations/`; the database file is created if missing.

use thiserror::Error;

use greengrocer_login::config::LoginConfig;
use greengrocer_storefront::config::StorefrontConfig;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    StorefrontConfig(#[from] greengrocer_storefront::config::ConfigError),

    #[error("Configuration error: {0}")]
    LoginConfig(#[from] greengrocer_login::config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration fails.
pub async fn storefront() -> Result<(), MigrationError> {
    let config = StorefrontConfig::from_env()?;

    tracing::info!("Connecting to storefront database...");
    let pool = greengrocer_storefront::db::create_pool(&config.database_url).await?;

    tracing::info!("Running storefront migrations...");
    greengrocer_storefront::db::migrate(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}

/// Run login demo database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration fails.
pub async fn login() -> Result<(), MigrationError> {
    let config = LoginConfig::from_env()?;

    tracing::info!("Connecting to login demo database...");
    let pool = greengrocer_login::db::create_pool(&config.database_url).await?;

    tracing::info!("Running login demo migrations...");
    greengrocer_login::db::migrate(&pool).await?;

    tracing::info!("Login demo migrations complete!");
    Ok(())
}
