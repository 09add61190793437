//! Admin login and logout.
//!
//! Admins share the users table with customers but only authenticate here.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use greengrocer_core::Role;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{Page, RequireAuth, end_session, push_flash, set_principal};
use crate::models::Flash;
use crate::routes::auth::CredentialsForm;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Admin login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct AdminLoginTemplate {
    pub page: Page,
}

/// Display the admin login form.
pub async fn login_page(page: Page) -> AdminLoginTemplate {
    AdminLoginTemplate { page }
}

/// Log an admin in.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());

    match auth
        .authenticate(&form.username, &form.password, Role::Admin)
        .await
    {
        Ok(principal) => {
            set_principal(&session, &principal).await?;
            set_sentry_user(&principal.user_id, principal.username.as_str());
            tracing::info!(user_id = %principal.user_id, "Admin logged in");
            Ok(Redirect::to("/admin").into_response())
        }
        Err(AuthError::Repository(e)) => Err(AppError::Database(e)),
        Err(_) => {
            tracing::warn!("Failed admin login attempt");
            push_flash(&session, Flash::danger("Invalid admin login")).await?;
            Ok(Redirect::to("/admin/login").into_response())
        }
    }
}

/// Log out and return to the admin login page.
#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn logout(RequireAuth(principal): RequireAuth, session: Session) -> Result<Redirect> {
    end_session(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/admin/login"))
}
