//! Greengrocer login demo - register, log in, see the dashboard.
//!
//! Serves on port 3002 with its own `users.db`. Migrations run at startup.

#![cfg_attr(not(test), forbid(unsafe_code))]

use greengrocer_login::config::LoginConfig;
use greengrocer_login::state::AppState;
use greengrocer_login::{app, db};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_sentry(config: &LoginConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    Some(sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    )))
}

#[tokio::main]
async fn main() {
    let config = LoginConfig::from_env().expect("Failed to load configuration");
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "greengrocer_login=info,tower_http=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    db::migrate(&pool).await.expect("Failed to run migrations");

    let app = app(AppState::new(config.clone(), pool))
        .await
        .expect("Failed to build router")
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("login demo listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
            tracing::info!("Shutdown signal received");
        })
        .await
        .expect("Server error");
}
