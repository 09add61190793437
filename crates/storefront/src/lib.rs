//! Greengrocer storefront library.
//!
//! The vegetable shop: catalog, cart, checkout and the admin panel. The
//! binary in `main.rs` wires configuration and telemetry around [`app`];
//! integration tests build the same router against an in-memory database.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::config::{StorefrontConfig, expose_admin_password};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Errors that stop the storefront from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("admin bootstrap failed: {0}")]
    AdminBootstrap(#[from] AuthError),

    #[error("failed to create upload directory: {0}")]
    UploadDir(#[from] std::io::Error),
}

/// Prepare the database and upload directory for serving.
///
/// Applies migrations, then creates the configured admin account when no
/// admin exists yet. Without `STOREFRONT_ADMIN_PASSWORD` the admin step is
/// skipped. Safe to run on every start.
///
/// # Errors
///
/// Returns `StartupError` if any step fails.
pub async fn bootstrap(state: &AppState) -> Result<(), StartupError> {
    db::migrate(state.pool()).await?;
    tokio::fs::create_dir_all(&state.config().upload_dir).await?;

    let admin = &state.config().admin;
    match expose_admin_password(admin) {
        Some(password) => {
            AuthService::new(state.pool())
                .ensure_admin(&admin.username, password)
                .await?;
        }
        None => tracing::warn!("STOREFRONT_ADMIN_PASSWORD not set, skipping admin bootstrap"),
    }

    Ok(())
}

/// Build the storefront router with all middleware applied.
///
/// # Errors
///
/// Returns `sqlx::Error` if the session table cannot be created.
pub async fn app(state: AppState) -> Result<Router, sqlx::Error> {
    let session_layer = middleware::create_session_layer(state.pool(), state.config()).await?;
    let static_dir = static_service(state.config());

    Ok(Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", static_dir)
        .layer(session_layer)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                        request_id = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state))
}

/// Static assets, with uploaded images served from the upload directory.
fn static_service(config: &StorefrontConfig) -> Router {
    Router::new()
        .nest_service("/images", ServeDir::new(&config.upload_dir))
        .fallback_service(ServeDir::new(&config.static_dir))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
