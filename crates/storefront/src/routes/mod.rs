//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (catalog)
//! GET  /product/{id}           - Product detail
//!
//! # Auth
//! GET  /register               - Register page
//! POST /register               - Register action
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! GET  /logout                 - Logout
//!
//! # Cart (customers only)
//! POST /add_to_cart/{id}       - Merge-add a product
//! GET  /cart                   - Cart page
//! POST /update_cart/{line}     - Step quantity (action=increase|decrease)
//! POST /remove_from_cart/{line} - Delete a line
//!
//! # Checkout (customers only)
//! GET  /checkout               - Summary and shipping form
//! POST /checkout               - Stamp shipping details on every line
//! GET  /order-success          - Confirmation
//!
//! # Admin
//! /admin/...                   - See `admin`
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the main routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/product/{id}", get(products::show))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/add_to_cart/{id}", post(cart::add))
        .route("/cart", get(cart::show))
        .route("/update_cart/{id}", post(cart::update))
        .route("/remove_from_cart/{id}", post(cart::remove))
        .route("/checkout", get(checkout::show).post(checkout::submit))
        .route("/order-success", get(checkout::success))
        .nest("/admin", admin::routes())
}
