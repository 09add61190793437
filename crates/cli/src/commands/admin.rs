//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create the configured admin (no-op when one exists)
//! gg-cli admin bootstrap
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - storefront `SQLite` URL
//! - `STOREFRONT_ADMIN_USERNAME` - bootstrap username (default: admin)
//! - `STOREFRONT_ADMIN_PASSWORD` - bootstrap password (required for `bootstrap`)

use thiserror::Error;

use greengrocer_storefront::config::{StorefrontConfig, expose_admin_password};
use greengrocer_storefront::db;
use greengrocer_storefront::services::auth::{AuthError, AuthService};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Configuration error: {0}")]
    Config(#[from] greengrocer_storefront::config::ConfigError),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

async fn connect(config: &StorefrontConfig) -> Result<sqlx::SqlitePool, AdminError> {
    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(&config.database_url).await?;
    db::migrate(&pool).await?;
    Ok(pool)
}

/// Create the configured admin account if no admin exists yet.
///
/// # Errors
///
/// Returns `AdminError::MissingEnvVar` without `STOREFRONT_ADMIN_PASSWORD`,
/// or an auth/database error if the account cannot be created.
pub async fn bootstrap() -> Result<(), AdminError> {
    let config = StorefrontConfig::from_env()?;
    let password = expose_admin_password(&config.admin)
        .ok_or(AdminError::MissingEnvVar("STOREFRONT_ADMIN_PASSWORD"))?;

    let pool = connect(&config).await?;
    let created = AuthService::new(&pool)
        .ensure_admin(&config.admin.username, password)
        .await?;

    if created {
        tracing::info!(username = %config.admin.username, "Admin account created");
    } else {
        tracing::info!("An admin account already exists, nothing to do");
    }
    Ok(())
}
