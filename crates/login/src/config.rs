//! Login demo configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `LOGIN_DATABASE_URL` - `SQLite` connection string (default: `sqlite://users.db`)
//! - `LOGIN_HOST` - Bind address (default: 127.0.0.1)
//! - `LOGIN_PORT` - Listen port (default: 3002)
//! - `LOGIN_BASE_URL` - Public URL (default: <http://localhost:3002>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://users.db";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Login demo configuration.
#[derive(Debug, Clone)]
pub struct LoginConfig {
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

impl LoginConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the host or port is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("LOGIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("LOGIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("LOGIN_PORT", "3002")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("LOGIN_PORT".to_string(), e.to_string()))?;

        Ok(Self {
            database_url: SecretString::from(get_env_or_default(
                "LOGIN_DATABASE_URL",
                DEFAULT_DATABASE_URL,
            )),
            host,
            port,
            base_url: get_env_or_default("LOGIN_BASE_URL", "http://localhost:3002"),
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            sentry_environment: std::env::var("SENTRY_ENVIRONMENT").ok(),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_https() {
        let mut config = LoginConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3002,
            base_url: "http://localhost:3002".to_string(),
            sentry_dsn: None,
            sentry_environment: None,
        };
        assert!(!config.is_https());
        assert_eq!(config.socket_addr().port(), 3002);

        config.base_url = "https://login.example.com".to_string();
        assert!(config.is_https());
    }
}
