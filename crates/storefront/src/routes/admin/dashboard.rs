//! Admin dashboard and order listing.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::{Page, RequireAdmin};
use crate::models::{AdminOrderRow, User};
use crate::routes::products::ProductView;
use crate::services::catalog::CatalogService;
use crate::services::checkout::CheckoutService;
use crate::state::AppState;

/// Account row for the dashboard.
#[derive(Debug, Clone)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub role: &'static str,
    pub joined: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_i64(),
            username: user.username.to_string(),
            role: user.role.as_str(),
            joined: user.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Order line row for the orders page.
///
/// Shipping columns are empty while the line is still in a cart.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: i64,
    pub username: String,
    pub product_name: String,
    pub quantity: i64,
    pub total: String,
    pub customer_name: String,
    pub address: String,
    pub mobile: String,
    pub payment_method: String,
    pub placed: bool,
}

impl From<&AdminOrderRow> for OrderView {
    fn from(row: &AdminOrderRow) -> Self {
        let line = &row.line;
        Self {
            id: line.id.as_i64(),
            username: row.username.clone(),
            product_name: row.product_name.clone(),
            quantity: line.quantity,
            total: row.total.to_string(),
            customer_name: line.customer_name.clone().unwrap_or_default(),
            address: line.address.clone().unwrap_or_default(),
            mobile: line.mobile.clone().unwrap_or_default(),
            payment_method: line.payment_method.clone().unwrap_or_default(),
            placed: line.is_checked_out(),
        }
    }
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub page: Page,
    pub products: Vec<ProductView>,
    pub users: Vec<UserView>,
}

/// Orders template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders.html")]
pub struct OrdersTemplate {
    pub page: Page,
    pub orders: Vec<OrderView>,
}

/// Display the dashboard: the catalog and every account.
#[instrument(skip_all, fields(admin_id = %admin.user_id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    page: Page,
) -> Result<DashboardTemplate> {
    let products = CatalogService::new(state.pool(), &state.config().upload_dir)
        .list()
        .await?;
    let users = UserRepository::new(state.pool()).list_all().await?;

    Ok(DashboardTemplate {
        page,
        products: products.iter().map(ProductView::from).collect(),
        users: users.iter().map(UserView::from).collect(),
    })
}

/// Display every order line in the store.
#[instrument(skip_all, fields(admin_id = %admin.user_id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    page: Page,
) -> Result<OrdersTemplate> {
    let rows = CheckoutService::new(state.pool()).all_orders().await?;

    Ok(OrdersTemplate {
        page,
        orders: rows.iter().map(OrderView::from).collect(),
    })
}
