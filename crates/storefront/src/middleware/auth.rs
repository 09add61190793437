//! Authentication middleware and extractors.
//!
//! Each extractor reads the session principal, evaluates a gate policy, and
//! turns a denial into the matching redirect. Handlers receive the principal
//! explicitly; nothing is stored in ambient state.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{Flash, Principal, session_keys};
use crate::services::gate::{self, Decision, DenyReason, Policy};

use super::flash::push_flash;

/// Notice shown when a non-admin reaches an admin page.
pub const ADMIN_REQUIRED_NOTICE: &str = "Admin access required!";

/// Error returned when a gate policy denies the request.
#[derive(Debug)]
pub enum AuthRejection {
    /// Not logged in: go to the customer login page.
    RedirectToLogin,
    /// Not an admin: go to the admin login page (notice already queued).
    RedirectToAdminLogin,
    /// Admin on a shopper page: back to the home page.
    RedirectHome,
    /// Session layer missing from the stack.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::RedirectToAdminLogin => Redirect::to("/admin/login").into_response(),
            Self::RedirectHome => Redirect::to("/").into_response(),
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// Read the principal stored in the session, if any.
pub(crate) async fn current_principal(session: &Session) -> Option<Principal> {
    session
        .get::<Principal>(session_keys::PRINCIPAL)
        .await
        .ok()
        .flatten()
}

/// Evaluate `policy` for the request and map a denial to its redirect.
async fn require(parts: &Parts, policy: Policy) -> Result<Principal, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::MissingSession)?;

    let principal = current_principal(session).await;

    match gate::evaluate(policy, principal.as_ref()) {
        Decision::Allow(principal) => Ok(principal),
        Decision::Deny(DenyReason::Unauthenticated) => Err(AuthRejection::RedirectToLogin),
        Decision::Deny(DenyReason::Forbidden) => {
            if let Err(e) = push_flash(session, Flash::danger(ADMIN_REQUIRED_NOTICE)).await {
                tracing::warn!(error = %e, "Failed to queue admin notice");
            }
            Err(AuthRejection::RedirectToAdminLogin)
        }
        Decision::Deny(DenyReason::AdminShopper) => Err(AuthRejection::RedirectHome),
    }
}

/// Extractor that requires any logged-in account.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(principal): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", principal.username)
/// }
/// ```
pub struct RequireAuth(pub Principal);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require(parts, Policy::Authenticated).await.map(Self)
    }
}

/// Extractor that requires a logged-in customer; admins are sent home.
pub struct RequireShopper(pub Principal);

impl<S> FromRequestParts<S> for RequireShopper
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require(parts, Policy::Shopper).await.map(Self)
    }
}

/// Extractor that requires a logged-in admin.
pub struct RequireAdmin(pub Principal);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require(parts, Policy::Admin).await.map(Self)
    }
}

/// Store the principal in the session after a successful login.
///
/// The session ID is rotated so a pre-login cookie cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_principal(
    session: &Session,
    principal: &Principal,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::PRINCIPAL, principal).await
}

/// End the session (logout). Safe to call when nobody is logged in.
///
/// # Errors
///
/// Returns an error if the session store cannot be updated.
pub async fn end_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<Principal>(session_keys::PRINCIPAL).await?;
    session.flush().await
}
