//! End-to-end flows for the standalone login demo.

#![allow(clippy::unwrap_used)]

use greengrocer_integration_tests::{location, spawn_login};
use reqwest::StatusCode;

#[tokio::test]
async fn test_login_page_is_served_at_root() {
    let app = spawn_login().await;

    for path in ["/", "/login"] {
        let resp = app.get(path).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.text().await.unwrap().contains("<h1>Login</h1>"));
    }
    assert_eq!(app.get("/health").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_then_login() {
    let app = spawn_login().await;

    let resp = app
        .post_form("/register", &[("username", "bob"), ("password", "hunter2")])
        .await;
    assert_eq!(location(&resp), "/login");
    assert!(
        app.page("/login")
            .await
            .contains("Registration successful! Please login.")
    );

    let resp = app
        .post_form("/login", &[("username", "bob"), ("password", "hunter2")])
        .await;
    assert_eq!(location(&resp), "/dashboard");

    let dashboard = app.page("/dashboard").await;
    assert!(dashboard.contains("Login successful!"));
    assert!(dashboard.contains("Welcome to the Dashboard!"));
    assert!(dashboard.contains("bob"));
}

#[tokio::test]
async fn test_root_accepts_login_posts() {
    let app = spawn_login().await;
    app.post_form("/register", &[("username", "bob"), ("password", "hunter2")])
        .await;

    let resp = app
        .post_form("/", &[("username", "bob"), ("password", "hunter2")])
        .await;
    assert_eq!(location(&resp), "/dashboard");
}

#[tokio::test]
async fn test_duplicate_username() {
    let app = spawn_login().await;
    app.post_form("/register", &[("username", "bob"), ("password", "hunter2")])
        .await;

    let resp = app
        .post_form("/register", &[("username", "bob"), ("password", "other")])
        .await;
    assert_eq!(location(&resp), "/register");
    assert!(
        app.page("/register")
            .await
            .contains("Username already exists. Try another.")
    );

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_bad_credentials() {
    let app = spawn_login().await;
    app.post_form("/register", &[("username", "bob"), ("password", "hunter2")])
        .await;

    let resp = app
        .post_form("/login", &[("username", "bob"), ("password", "wrong")])
        .await;
    assert_eq!(location(&resp), "/login");
    assert!(
        app.page("/login")
            .await
            .contains("Invalid username or password")
    );
    assert_eq!(location(&app.get("/dashboard").await), "/login");
}

#[tokio::test]
async fn test_dashboard_requires_login_and_logout_ends_it() {
    let app = spawn_login().await;
    assert_eq!(location(&app.get("/dashboard").await), "/login");

    app.post_form("/register", &[("username", "bob"), ("password", "hunter2")])
        .await;
    app.post_form("/login", &[("username", "bob"), ("password", "hunter2")])
        .await;
    assert_eq!(app.get("/dashboard").await.status(), StatusCode::OK);

    let resp = app.post_form("/logout", &[]).await;
    assert_eq!(location(&resp), "/login");
    assert_eq!(location(&app.get("/dashboard").await), "/login");
}

#[tokio::test]
async fn test_passwords_are_hashed() {
    let app = spawn_login().await;
    app.post_form("/register", &[("username", "bob"), ("password", "hunter2")])
        .await;

    let hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE username = 'bob'")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert!(hash.starts_with("$argon2"));
}
