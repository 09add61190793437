//! Catalog route handlers: the home page listing and product detail.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use greengrocer_core::ProductId;

use crate::error::Result;
use crate::filters;
use crate::middleware::Page;
use crate::models::Product;
use crate::services::catalog::CatalogService;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub price: String,
    pub image_url: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name.clone(),
            price: product.price.to_string(),
            image_url: product.image_url(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Home page template: every product in the catalog.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub page: Page,
    pub products: Vec<ProductView>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub page: Page,
    pub product: ProductView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the home page.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, page: Page) -> Result<IndexTemplate> {
    let catalog = CatalogService::new(state.pool(), &state.config().upload_dir);
    let products = catalog.list().await?;

    Ok(IndexTemplate {
        page,
        products: products.iter().map(ProductView::from).collect(),
    })
}

/// Display a single product.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    page: Page,
    Path(id): Path<i64>,
) -> Result<ProductTemplate> {
    let catalog = CatalogService::new(state.pool(), &state.config().upload_dir);
    let product = catalog.get(ProductId::new(id)).await?;

    Ok(ProductTemplate {
        page,
        product: ProductView::from(&product),
    })
}
