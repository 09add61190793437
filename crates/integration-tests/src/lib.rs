//! Integration test harness for Greengrocer.
//!
//! Each test boots a real router on an ephemeral port, backed by a private
//! in-memory `SQLite` database, and drives it over HTTP with a cookie-keeping
//! `reqwest` client that does not follow redirects.
//!
//! ```bash
//! cargo test -p greengrocer-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::path::PathBuf;

use reqwest::{Client, Response, header::LOCATION, redirect};
use secrecy::SecretString;
use sqlx::SqlitePool;
use tokio::net::TcpListener;

use greengrocer_storefront::config::{AdminBootstrapConfig, StorefrontConfig};

/// Bootstrap admin used by every storefront test.
pub const ADMIN_USERNAME: &str = "grocer";
pub const ADMIN_PASSWORD: &str = "Kq7#vLm2!pZx9Tr";

/// A running server plus a client with its own cookie jar.
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    /// The server's database, for asserting on stored rows.
    pub pool: SqlitePool,
    /// Where uploaded product images land.
    pub upload_dir: PathBuf,
}

/// Client that keeps cookies and reports redirects instead of following them.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .unwrap()
}

async fn serve(app: axum::Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Start the storefront with migrations applied and the admin bootstrapped.
pub async fn spawn_storefront() -> TestApp {
    let upload_dir = std::env::temp_dir().join(format!("gg-uploads-{}", uuid::Uuid::new_v4()));
    let static_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../storefront/static");

    let config = StorefrontConfig {
        database_url: SecretString::from("sqlite::memory:"),
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        static_dir,
        upload_dir: upload_dir.clone(),
        admin: AdminBootstrapConfig {
            username: ADMIN_USERNAME.to_string(),
            password: Some(SecretString::from(ADMIN_PASSWORD)),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    };

    let pool = greengrocer_storefront::db::create_memory_pool().await.unwrap();
    let state = greengrocer_storefront::state::AppState::new(config, pool.clone());
    greengrocer_storefront::bootstrap(&state).await.unwrap();
    let app = greengrocer_storefront::app(state).await.unwrap();

    let addr = serve(app).await;
    TestApp {
        base_url: format!("http://{addr}"),
        client: client(),
        pool,
        upload_dir,
    }
}

/// Start the login demo with migrations applied.
pub async fn spawn_login() -> TestApp {
    let config = greengrocer_login::config::LoginConfig {
        database_url: SecretString::from("sqlite::memory:"),
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        sentry_dsn: None,
        sentry_environment: None,
    };

    let pool = greengrocer_login::db::create_memory_pool().await.unwrap();
    greengrocer_login::db::migrate(&pool).await.unwrap();
    let state = greengrocer_login::state::AppState::new(config, pool.clone());
    let app = greengrocer_login::app(state).await.unwrap();

    let addr = serve(app).await;
    TestApp {
        base_url: format!("http://{addr}"),
        client: client(),
        pool,
        upload_dir: std::env::temp_dir(),
    }
}

impl TestApp {
    /// A second visitor against the same server, with an empty cookie jar.
    #[must_use]
    pub fn new_visitor(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            client: client(),
            pool: self.pool.clone(),
            upload_dir: self.upload_dir.clone(),
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    /// GET a page and return its body.
    pub async fn page(&self, path: &str) -> String {
        self.get(path).await.text().await.unwrap()
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    pub async fn post_multipart(&self, path: &str, form: reqwest::multipart::Form) -> Response {
        self.client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .unwrap()
    }

    /// Register then log in through the customer forms.
    pub async fn register_and_login(&self, username: &str, password: &str) {
        let resp = self
            .post_form("/register", &[("username", username), ("password", password)])
            .await;
        assert_eq!(location(&resp), "/login");

        let resp = self
            .post_form("/login", &[("username", username), ("password", password)])
            .await;
        assert_eq!(location(&resp), "/");
    }

    /// Log in through the admin form with the bootstrap credentials.
    pub async fn login_admin(&self) {
        let resp = self
            .post_form(
                "/admin/login",
                &[("username", ADMIN_USERNAME), ("password", ADMIN_PASSWORD)],
            )
            .await;
        assert_eq!(location(&resp), "/admin");
    }
}

/// The `Location` header of a redirect response.
#[must_use]
pub fn location(resp: &Response) -> String {
    assert!(
        resp.status().is_redirection(),
        "expected a redirect, got {}",
        resp.status()
    );
    resp.headers()
        .get(LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}
