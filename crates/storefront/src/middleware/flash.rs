//! One-shot flash notices and the per-page context extractor.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::models::{Flash, Principal, session_keys};

use super::auth::current_principal;

/// Queue a notice for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn push_flash(
    session: &Session,
    flash: Flash,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::FLASH, flash).await
}

/// Remove and return the pending notice.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    session
        .remove::<Flash>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
}

/// What every rendered page needs: who is logged in and the pending notice.
///
/// Extracting this consumes the flash.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub principal: Option<Principal>,
    pub flash: Option<Flash>,
}

impl Page {
    /// Whether a customer (not an admin) is logged in.
    #[must_use]
    pub fn is_shopper(&self) -> bool {
        self.principal.as_ref().is_some_and(|p| !p.is_admin())
    }

    /// Whether an admin is logged in.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.principal.as_ref().is_some_and(Principal::is_admin)
    }

    /// Whether anyone is logged in.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.principal.is_some()
    }

    /// Pending notice text, or empty.
    #[must_use]
    pub fn flash_message(&self) -> &str {
        self.flash.as_ref().map_or("", |f| f.message.as_str())
    }

    /// CSS class for the pending notice.
    #[must_use]
    pub fn flash_class(&self) -> &'static str {
        self.flash.as_ref().map_or("info", |f| f.level.css_class())
    }

    /// Username of the logged-in account, or empty.
    #[must_use]
    pub fn username(&self) -> &str {
        self.principal.as_ref().map_or("", |p| p.username.as_str())
    }
}

impl<S> FromRequestParts<S> for Page
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self::default());
        };

        let principal = current_principal(session).await;
        let flash = take_flash(session).await;

        Ok(Self { principal, flash })
    }
}
