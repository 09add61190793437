//! HTTP route handlers for the login demo.
//!
//! ```text
//! GET  /, /login               - Login page
//! POST /, /login               - Login action
//! GET  /register               - Register page
//! POST /register               - Register action
//! GET  /dashboard              - Welcome page (logged in only)
//! POST /logout                 - Logout
//! ```

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::auth::{AuthError, AuthService};
use crate::error::Result;
use crate::filters;
use crate::session::{
    Notice, SessionAccount, current_account, log_in, log_out, push_notice, take_notice,
};
use crate::state::AppState;

/// Create the router for every demo page.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(login_page).post(login))
        .route("/login", get(login_page).post(login))
        .route("/register", get(register_page).post(register))
        .route("/dashboard", get(dashboard))
        .route("/logout", post(logout))
}

/// Username/password form.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub notice: Option<Notice>,
}

#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub notice: Option<Notice>,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub notice: Option<Notice>,
    pub username: String,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn register_page(session: Session) -> RegisterTemplate {
    RegisterTemplate {
        notice: take_notice(&session).await,
    }
}

/// Create an account and send the visitor to the login page.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Result<Redirect> {
    let auth = AuthService::new(state.pool());

    let (notice, target) = match auth.register(&form.username, &form.password).await {
        Ok(_) => (
            Notice::success("Registration successful! Please login."),
            "/login",
        ),
        Err(AuthError::DuplicateUsername) => (
            Notice::error("Username already exists. Try another."),
            "/register",
        ),
        Err(AuthError::InvalidUsername(e)) => {
            (Notice::error(format!("Invalid username: {e}")), "/register")
        }
        Err(AuthError::Password(_)) => (Notice::error("Password is required"), "/register"),
        Err(e) => return Err(e.into()),
    };

    push_notice(&session, notice).await?;
    Ok(Redirect::to(target))
}

pub async fn login_page(session: Session) -> LoginTemplate {
    LoginTemplate {
        notice: take_notice(&session).await,
    }
}

/// Check credentials and open a session.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Result<Redirect> {
    let auth = AuthService::new(state.pool());

    match auth.authenticate(&form.username, &form.password).await {
        Ok(account) => {
            log_in(
                &session,
                &SessionAccount {
                    id: account.id,
                    username: account.username,
                },
            )
            .await?;
            push_notice(&session, Notice::success("Login successful!")).await?;
            Ok(Redirect::to("/dashboard"))
        }
        Err(AuthError::InvalidCredentials) => {
            push_notice(&session, Notice::error("Invalid username or password")).await?;
            Ok(Redirect::to("/login"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Welcome page for the logged-in account.
pub async fn dashboard(session: Session) -> Response {
    let Some(account) = current_account(&session).await else {
        return Redirect::to("/login").into_response();
    };

    DashboardTemplate {
        notice: take_notice(&session).await,
        username: account.username.into_inner(),
    }
    .into_response()
}

/// End the session.
pub async fn logout(session: Session) -> Result<Redirect> {
    log_out(&session).await?;
    push_notice(&session, Notice::success("You have been logged out.")).await?;
    Ok(Redirect::to("/login"))
}
