//! Admin panel route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /admin/login            - Admin login page
//! POST /admin/login            - Admin login action
//! GET  /admin/logout           - Logout
//! GET  /admin                  - Dashboard (products + users)
//! GET  /admin/orders           - Every order line
//! GET  /admin/add              - New product form
//! POST /admin/add              - Create product (multipart)
//! GET  /admin/edit/{id}        - Edit product form
//! POST /admin/edit/{id}        - Update product (multipart)
//! POST /admin/delete/{id}      - Delete product
//! ```

pub mod auth;
pub mod dashboard;
pub mod products;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

/// Largest accepted product form, image included.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Create the admin router, mounted under `/admin`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/orders", get(dashboard::orders))
        .route("/add", get(products::new_page).post(products::create))
        .route("/edit/{id}", get(products::edit_page).post(products::update))
        .route("/delete/{id}", post(products::delete))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
