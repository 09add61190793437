//! Greengrocer login demo library.
//!
//! A standalone username/password register-and-login site with its own
//! `SQLite` database. It shares the validated `Username` and
//! `PasswordDigest` types with the storefront and nothing else.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod routes;
pub mod session;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the login demo router with sessions and request tracing.
///
/// # Errors
///
/// Returns `sqlx::Error` if the session table cannot be created.
pub async fn app(state: AppState) -> Result<Router, sqlx::Error> {
    let session_layer = session::create_session_layer(state.pool(), state.config()).await?;

    Ok(Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

async fn health() -> &'static str {
    "ok"
}

async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
