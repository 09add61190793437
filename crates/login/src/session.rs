//! Sessions and one-shot notices for the demo.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use greengrocer_core::{UserId, Username};

use crate::config::LoginConfig;

/// Session cookie name. Distinct from the storefront's so both can run on one host.
pub const SESSION_COOKIE_NAME: &str = "gg_login_session";

const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

const ACCOUNT_KEY: &str = "account";
const NOTICE_KEY: &str = "notice";

/// The logged-in account as stored in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAccount {
    pub id: UserId,
    pub username: Username,
}

/// A one-shot message for the next rendered page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    /// `success` or `error`.
    pub kind: String,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: "success".to_owned(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: "error".to_owned(),
            message: message.into(),
        }
    }
}

/// Create the session layer with a `SQLite` store.
///
/// # Errors
///
/// Returns `sqlx::Error` if the session table cannot be created.
pub async fn create_session_layer(
    pool: &SqlitePool,
    config: &LoginConfig,
) -> Result<SessionManagerLayer<SqliteStore>, sqlx::Error> {
    let store = SqliteStore::new(pool.clone());
    store.migrate().await?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true))
}

/// The logged-in account, if any.
pub async fn current_account(session: &Session) -> Option<SessionAccount> {
    session
        .get::<SessionAccount>(ACCOUNT_KEY)
        .await
        .ok()
        .flatten()
}

/// Log an account in, rotating the session ID.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn log_in(
    session: &Session,
    account: &SessionAccount,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(ACCOUNT_KEY, account).await
}

/// End the session.
///
/// # Errors
///
/// Returns an error if the session store cannot be updated.
pub async fn log_out(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

/// Queue a notice for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn push_notice(
    session: &Session,
    notice: Notice,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(NOTICE_KEY, notice).await
}

/// Remove and return the pending notice.
pub async fn take_notice(session: &Session) -> Option<Notice> {
    session.remove::<Notice>(NOTICE_KEY).await.ok().flatten()
}
