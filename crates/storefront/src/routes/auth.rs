//! Customer registration, login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use greengrocer_core::Role;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{Page, RequireAuth, end_session, push_flash, set_principal};
use crate::models::Flash;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Username/password form shared by register and both login pages.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Customer login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub page: Page,
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub page: Page,
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration form.
pub async fn register_page(page: Page) -> RegisterTemplate {
    RegisterTemplate { page }
}

/// Create a customer account.
///
/// Registration never logs the new account in.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());

    let (flash, target) = match auth.register(&form.username, &form.password).await {
        Ok(_) => (Flash::success("Registered successfully!"), "/login"),
        Err(AuthError::DuplicateUsername) => (Flash::danger("Username already exists"), "/register"),
        Err(AuthError::Repository(e)) => return Err(AppError::Database(e)),
        Err(e) => (Flash::danger(input_notice(&e)), "/register"),
    };

    push_flash(&session, flash).await?;
    Ok(Redirect::to(target).into_response())
}

/// Notice text for a rejected registration.
fn input_notice(error: &AuthError) -> String {
    match error {
        AuthError::InvalidUsername(e) => format!("Invalid username: {e}"),
        AuthError::Password(_) => "Password is required".to_owned(),
        other => other.to_string(),
    }
}

// =============================================================================
// Login / Logout
// =============================================================================

/// Display the customer login form.
pub async fn login_page(page: Page) -> LoginTemplate {
    LoginTemplate { page }
}

/// Log a customer in.
///
/// Admin accounts are not accepted here; they use `/admin/login`.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());

    match auth
        .authenticate(&form.username, &form.password, Role::Customer)
        .await
    {
        Ok(principal) => {
            set_principal(&session, &principal).await?;
            set_sentry_user(&principal.user_id, principal.username.as_str());
            tracing::info!(user_id = %principal.user_id, "Customer logged in");
            Ok(Redirect::to("/").into_response())
        }
        Err(AuthError::Repository(e)) => Err(AppError::Database(e)),
        Err(_) => {
            push_flash(&session, Flash::danger("Invalid credentials")).await?;
            Ok(Redirect::to("/login").into_response())
        }
    }
}

/// Log out and return to the home page.
#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn logout(RequireAuth(principal): RequireAuth, session: Session) -> Result<Redirect> {
    end_session(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}
