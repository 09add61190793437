//! End-to-end storefront flows: accounts, cart, checkout and the admin panel.

#![allow(clippy::unwrap_used)]

use greengrocer_integration_tests::{TestApp, location, spawn_storefront};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};

/// Tiny PNG signature; the server only checks the filename.
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n";

fn product_form(name: &str, price: &str, filename: &str) -> Form {
    Form::new()
        .text("name", name.to_owned())
        .text("price", price.to_owned())
        .part(
            "image",
            Part::bytes(PNG_BYTES.to_vec()).file_name(filename.to_owned()),
        )
}

/// Create a product through the admin panel and return its ID.
async fn add_product(app: &TestApp, name: &str, price: &str) -> i64 {
    let admin = app.new_visitor();
    admin.login_admin().await;

    let resp = admin
        .post_multipart("/admin/add", product_form(name, price, "veg.png"))
        .await;
    assert_eq!(location(&resp), "/admin");

    sqlx::query_scalar("SELECT id FROM products WHERE name = ?")
        .bind(name)
        .fetch_one(&app.pool)
        .await
        .unwrap()
}

async fn line_quantities(app: &TestApp) -> Vec<(i64, i64)> {
    sqlx::query_as("SELECT id, quantity FROM order_lines ORDER BY id")
        .fetch_all(&app.pool)
        .await
        .unwrap()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = spawn_storefront().await;

    assert_eq!(app.get("/health").await.status(), StatusCode::OK);
    assert_eq!(app.get("/health/ready").await.status(), StatusCode::OK);

    let resp = app.get("/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert!(resp.headers().contains_key("content-security-policy"));
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
async fn test_register_and_login() {
    let app = spawn_storefront().await;

    let resp = app
        .post_form("/register", &[("username", "alice"), ("password", "pw1")])
        .await;
    assert_eq!(location(&resp), "/login");
    assert!(app.page("/login").await.contains("Registered successfully!"));

    let resp = app
        .post_form("/login", &[("username", "alice"), ("password", "pw1")])
        .await;
    assert_eq!(location(&resp), "/");
    assert!(app.page("/").await.contains("Logout (alice)"));
}

#[tokio::test]
async fn test_wrong_password_stays_anonymous() {
    let app = spawn_storefront().await;
    app.post_form("/register", &[("username", "alice"), ("password", "pw1")])
        .await;

    let resp = app
        .post_form("/login", &[("username", "alice"), ("password", "nope")])
        .await;
    assert_eq!(location(&resp), "/login");
    assert!(app.page("/login").await.contains("Invalid credentials"));

    let resp = app.get("/cart").await;
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn test_duplicate_registration() {
    let app = spawn_storefront().await;
    app.post_form("/register", &[("username", "alice"), ("password", "pw1")])
        .await;

    let resp = app
        .post_form("/register", &[("username", "alice"), ("password", "pw2")])
        .await;
    assert_eq!(location(&resp), "/register");
    assert!(app.page("/register").await.contains("Username already exists"));
}

#[tokio::test]
async fn test_admin_cannot_use_customer_login() {
    let app = spawn_storefront().await;

    let resp = app
        .post_form(
            "/login",
            &[
                ("username", greengrocer_integration_tests::ADMIN_USERNAME),
                ("password", greengrocer_integration_tests::ADMIN_PASSWORD),
            ],
        )
        .await;
    assert_eq!(location(&resp), "/login");
    assert!(app.page("/login").await.contains("Invalid credentials"));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = spawn_storefront().await;
    app.register_and_login("alice", "pw1").await;

    let resp = app.get("/logout").await;
    assert_eq!(location(&resp), "/");
    assert_eq!(location(&app.get("/cart").await), "/login");
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_add_twice_merges_and_decrease_floors_at_one() {
    let app = spawn_storefront().await;
    let carrot = add_product(&app, "Carrot", "30").await;
    app.register_and_login("alice", "pw1").await;

    let add = format!("/add_to_cart/{carrot}");
    let resp = app.post_form(&add, &[("quantity", "2")]).await;
    assert_eq!(location(&resp), "/cart");
    app.post_form(&add, &[("quantity", "3")]).await;

    let lines = line_quantities(&app).await;
    assert_eq!(lines.len(), 1);
    let (line_id, quantity) = lines[0];
    assert_eq!(quantity, 5);

    let update = format!("/update_cart/{line_id}");
    for _ in 0..2 {
        let resp = app.post_form(&update, &[("action", "decrease")]).await;
        assert_eq!(location(&resp), "/cart");
    }
    assert_eq!(line_quantities(&app).await, vec![(line_id, 3)]);

    for _ in 0..5 {
        app.post_form(&update, &[("action", "decrease")]).await;
    }
    assert_eq!(line_quantities(&app).await, vec![(line_id, 1)]);

    app.post_form(&update, &[("action", "increase")]).await;
    assert_eq!(line_quantities(&app).await, vec![(line_id, 2)]);

    let cart = app.page("/cart").await;
    assert!(cart.contains("Carrot"));
    assert!(cart.contains("₹60.00"));
}

#[tokio::test]
async fn test_add_defaults_to_one_and_rejects_bad_quantity() {
    let app = spawn_storefront().await;
    let leek = add_product(&app, "Leek", "12.50").await;
    app.register_and_login("alice", "pw1").await;

    app.post_form(&format!("/add_to_cart/{leek}"), &[]).await;
    assert_eq!(line_quantities(&app).await[0].1, 1);

    let resp = app
        .post_form(&format!("/add_to_cart/{leek}"), &[("quantity", "0")])
        .await;
    assert_eq!(location(&resp), format!("/product/{leek}"));
    assert_eq!(line_quantities(&app).await[0].1, 1);

    let resp = app.post_form("/add_to_cart/9999", &[]).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_oversized_quantities_leave_the_cart_usable() {
    let app = spawn_storefront().await;
    let leek = add_product(&app, "Leek", "12.50").await;
    app.register_and_login("alice", "pw1").await;
    let add = format!("/add_to_cart/{leek}");

    app.post_form(&add, &[("quantity", "9999")]).await;

    for quantity in ["2", "9223372036854775807", "99999999999999999999"] {
        let resp = app.post_form(&add, &[("quantity", quantity)]).await;
        assert_eq!(location(&resp), format!("/product/{leek}"), "{quantity}");
    }
    assert_eq!(line_quantities(&app).await[0].1, 9999);

    let cart = app.page("/cart").await;
    assert!(cart.contains("Leek"));
    assert_eq!(app.get("/checkout").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_other_users_lines_are_untouchable() {
    let app = spawn_storefront().await;
    let kale = add_product(&app, "Kale", "20").await;
    app.register_and_login("alice", "pw1").await;
    app.post_form(&format!("/add_to_cart/{kale}"), &[("quantity", "4")])
        .await;
    let (line_id, _) = line_quantities(&app).await[0];

    let bob = app.new_visitor();
    bob.register_and_login("bob", "pw2").await;

    let resp = bob
        .post_form(&format!("/update_cart/{line_id}"), &[("action", "increase")])
        .await;
    assert_eq!(location(&resp), "/cart");
    let resp = bob.post_form(&format!("/remove_from_cart/{line_id}"), &[]).await;
    assert_eq!(location(&resp), "/cart");

    assert_eq!(line_quantities(&app).await, vec![(line_id, 4)]);

    let resp = bob
        .post_form("/update_cart/9999", &[("action", "increase")])
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_remove_line() {
    let app = spawn_storefront().await;
    let beet = add_product(&app, "Beetroot", "18").await;
    app.register_and_login("alice", "pw1").await;
    app.post_form(&format!("/add_to_cart/{beet}"), &[]).await;
    let (line_id, _) = line_quantities(&app).await[0];

    let resp = app
        .post_form(&format!("/remove_from_cart/{line_id}"), &[])
        .await;
    assert_eq!(location(&resp), "/cart");
    assert!(line_quantities(&app).await.is_empty());
    assert!(app.page("/cart").await.contains("Item removed"));
}

#[tokio::test]
async fn test_admin_is_bounced_from_shopper_routes() {
    let app = spawn_storefront().await;
    let okra = add_product(&app, "Okra", "22").await;
    app.login_admin().await;

    let resp = app.post_form(&format!("/add_to_cart/{okra}"), &[]).await;
    assert_eq!(location(&resp), "/");
    assert_eq!(location(&app.get("/cart").await), "/");
    assert_eq!(location(&app.get("/checkout").await), "/");
    assert!(line_quantities(&app).await.is_empty());
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_stamps_every_line() {
    let app = spawn_storefront().await;
    let onion = add_product(&app, "Onion", "35").await;
    let garlic = add_product(&app, "Garlic", "80").await;
    app.register_and_login("alice", "pw1").await;
    app.post_form(&format!("/add_to_cart/{onion}"), &[("quantity", "2")])
        .await;
    app.post_form(&format!("/add_to_cart/{garlic}"), &[]).await;

    assert_eq!(app.get("/checkout").await.status(), StatusCode::OK);

    let resp = app
        .post_form(
            "/checkout",
            &[
                ("name", "Alice Smith"),
                ("address", "12 Market Street"),
                ("mobile", "9876543210"),
                ("payment", "COD"),
            ],
        )
        .await;
    assert_eq!(location(&resp), "/order-success");
    assert!(app.page("/order-success").await.contains("Order placed successfully!"));

    let stamped: Vec<(String, String, String, String)> = sqlx::query_as(
        "SELECT customer_name, address, mobile, payment_method FROM order_lines",
    )
    .fetch_all(&app.pool)
    .await
    .unwrap();
    assert_eq!(stamped.len(), 2);
    for row in stamped {
        assert_eq!(
            row,
            (
                "Alice Smith".to_owned(),
                "12 Market Street".to_owned(),
                "9876543210".to_owned(),
                "COD".to_owned()
            )
        );
    }
}

#[tokio::test]
async fn test_checkout_with_empty_cart() {
    let app = spawn_storefront().await;
    app.register_and_login("alice", "pw1").await;

    let resp = app.get("/checkout").await;
    assert_eq!(location(&resp), "/cart");
    assert!(app.page("/cart").await.contains("Your cart is empty"));

    let resp = app
        .post_form(
            "/checkout",
            &[
                ("name", "Alice"),
                ("address", "Somewhere"),
                ("mobile", "123"),
                ("payment", "COD"),
            ],
        )
        .await;
    assert_eq!(location(&resp), "/cart");

    let resp = app
        .post_form(
            "/checkout",
            &[("name", ""), ("address", ""), ("mobile", ""), ("payment", "")],
        )
        .await;
    assert_eq!(location(&resp), "/cart");
    assert!(app.page("/cart").await.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_checkout_rejects_overlong_mobile() {
    let app = spawn_storefront().await;
    let peas = add_product(&app, "Peas", "40").await;
    app.register_and_login("alice", "pw1").await;
    app.post_form(&format!("/add_to_cart/{peas}"), &[]).await;

    let resp = app
        .post_form(
            "/checkout",
            &[
                ("name", "Alice"),
                ("address", "Somewhere"),
                ("mobile", "1234567890123456"),
                ("payment", "COD"),
            ],
        )
        .await;
    assert_eq!(location(&resp), "/checkout");

    let unstamped: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM order_lines WHERE customer_name IS NULL")
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(unstamped, 1);
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
async fn test_admin_pages_require_admin() {
    let app = spawn_storefront().await;

    assert_eq!(location(&app.get("/admin").await), "/admin/login");
    assert!(app.page("/admin/login").await.contains("Admin access required!"));

    app.register_and_login("alice", "pw1").await;
    let resp = app.get("/admin").await;
    assert_eq!(location(&resp), "/admin/login");
    assert!(app.page("/admin/login").await.contains("Admin access required!"));
}

#[tokio::test]
async fn test_admin_login_failure() {
    let app = spawn_storefront().await;

    let resp = app
        .post_form("/admin/login", &[("username", "grocer"), ("password", "wrong")])
        .await;
    assert_eq!(location(&resp), "/admin/login");
    assert!(app.page("/admin/login").await.contains("Invalid admin login"));
}

#[tokio::test]
async fn test_upload_extension_is_checked() {
    let app = spawn_storefront().await;
    app.login_admin().await;

    let resp = app
        .post_multipart("/admin/add", product_form("Turnip", "15", "payload.exe"))
        .await;
    assert_eq!(location(&resp), "/admin/add");
    assert!(app.page("/admin/add").await.contains("invalid upload"));
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);

    let resp = app
        .post_multipart("/admin/add", product_form("Turnip", "15", "turnip.png"))
        .await;
    assert_eq!(location(&resp), "/admin");
    assert!(app.page("/admin").await.contains("Turnip"));
    assert!(app.upload_dir.join("turnip.png").exists());

    let resp = app.get("/static/images/turnip.png").await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_edit_keeps_image_when_no_file_sent() {
    let app = spawn_storefront().await;
    let id = add_product(&app, "Radish", "10").await;
    app.login_admin().await;

    let form = Form::new()
        .text("name", "Red Radish")
        .text("price", "11.5")
        .part("image", Part::bytes(Vec::new()).file_name(""));
    let resp = app.post_multipart(&format!("/admin/edit/{id}"), form).await;
    assert_eq!(location(&resp), "/admin");

    let (name, price, image): (String, String, String) =
        sqlx::query_as("SELECT name, price, image FROM products WHERE id = ?")
            .bind(id)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(name, "Red Radish");
    assert_eq!(price, "11.5");
    assert_eq!(image, "veg.png");

    let resp = app
        .post_multipart(
            &format!("/admin/edit/{id}"),
            product_form("Red Radish", "11.5", "radish.exe"),
        )
        .await;
    assert_eq!(location(&resp), format!("/admin/edit/{id}"));

    let resp = app.get("/admin/edit/9999").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_product_removes_its_lines() {
    let app = spawn_storefront().await;
    let id = add_product(&app, "Cabbage", "25").await;

    let shopper = app.new_visitor();
    shopper.register_and_login("alice", "pw1").await;
    shopper.post_form(&format!("/add_to_cart/{id}"), &[]).await;
    assert_eq!(line_quantities(&app).await.len(), 1);

    app.login_admin().await;
    let resp = app.post_form(&format!("/admin/delete/{id}"), &[]).await;
    assert_eq!(location(&resp), "/admin");
    assert!(line_quantities(&app).await.is_empty());

    assert_eq!(
        app.get(&format!("/product/{id}")).await.status(),
        StatusCode::NOT_FOUND
    );
    let resp = app.post_form(&format!("/admin/delete/{id}"), &[]).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_orders_lists_every_line() {
    let app = spawn_storefront().await;
    let id = add_product(&app, "Pumpkin", "55").await;

    let shopper = app.new_visitor();
    shopper.register_and_login("alice", "pw1").await;
    shopper
        .post_form(&format!("/add_to_cart/{id}"), &[("quantity", "2")])
        .await;

    app.login_admin().await;
    let page = app.page("/admin/orders").await;
    assert!(page.contains("Pumpkin"));
    assert!(page.contains("alice"));
    assert!(page.contains("In cart"));
}
