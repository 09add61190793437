//! Admin product management: create, edit and delete, with image upload.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use greengrocer_core::{ALLOWED_IMAGE_EXTENSIONS, ProductId};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Page, RequireAdmin, push_flash};
use crate::models::Flash;
use crate::routes::products::ProductView;
use crate::services::catalog::{CatalogError, CatalogService, ImageUpload, ProductSubmission};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// New product form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/add.html")]
pub struct AddProductTemplate {
    pub page: Page,
    pub accept: String,
}

/// Edit product form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/edit.html")]
pub struct EditProductTemplate {
    pub page: Page,
    pub product: ProductView,
    /// Price without the currency symbol, for the input field.
    pub price_value: String,
    pub accept: String,
}

/// `accept` attribute for the image input.
fn accepted_extensions() -> String {
    ALLOWED_IMAGE_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",")
}

// =============================================================================
// Multipart
// =============================================================================

/// Collect the `name`, `price` and `image` parts of a product form.
///
/// Unknown parts are ignored.
async fn read_submission(mut multipart: Multipart) -> Result<ProductSubmission> {
    let mut submission = ProductSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed form: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "name" => submission.name = read_text(field).await?,
            "price" => submission.price = read_text(field).await?,
            "image" => {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;
                submission.image = Some(ImageUpload {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(submission)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed form: {e}")))
}

/// Notice text for a rejected product form, or `None` for a server fault.
fn rejection_notice(error: &CatalogError) -> Option<String> {
    match error {
        CatalogError::InvalidName(_)
        | CatalogError::InvalidPrice(_)
        | CatalogError::InvalidUpload(_) => Some(error.to_string()),
        CatalogError::NotFound | CatalogError::Storage(_) | CatalogError::Repository(_) => None,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the new product form.
pub async fn new_page(RequireAdmin(_admin): RequireAdmin, page: Page) -> AddProductTemplate {
    AddProductTemplate {
        page,
        accept: accepted_extensions(),
    }
}

/// Create a product from the multipart form.
#[instrument(skip_all, fields(admin_id = %admin.user_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    multipart: Multipart,
) -> Result<Response> {
    let submission = read_submission(multipart).await?;
    let catalog = CatalogService::new(state.pool(), &state.config().upload_dir);

    match catalog.create(submission).await {
        Ok(_) => {
            push_flash(&session, Flash::success("Product added successfully!")).await?;
            Ok(Redirect::to("/admin").into_response())
        }
        Err(e) => match rejection_notice(&e) {
            Some(notice) => {
                push_flash(&session, Flash::danger(notice)).await?;
                Ok(Redirect::to("/admin/add").into_response())
            }
            None => Err(e.into()),
        },
    }
}

/// Display the edit form for a product.
#[instrument(skip(state, page))]
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    page: Page,
    Path(id): Path<i64>,
) -> Result<EditProductTemplate> {
    let product = CatalogService::new(state.pool(), &state.config().upload_dir)
        .get(ProductId::new(id))
        .await?;

    Ok(EditProductTemplate {
        page,
        price_value: format!("{:.2}", product.price.amount),
        product: ProductView::from(&product),
        accept: accepted_extensions(),
    })
}

/// Update a product from the multipart form.
///
/// Leaving the image input empty keeps the current image.
#[instrument(skip(state, session, multipart))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    session: Session,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Response> {
    let submission = read_submission(multipart).await?;
    let catalog = CatalogService::new(state.pool(), &state.config().upload_dir);

    match catalog.update(ProductId::new(id), submission).await {
        Ok(_) => {
            push_flash(&session, Flash::success("Product updated successfully!")).await?;
            Ok(Redirect::to("/admin").into_response())
        }
        Err(e) => match rejection_notice(&e) {
            Some(notice) => {
                push_flash(&session, Flash::danger(notice)).await?;
                Ok(Redirect::to(&format!("/admin/edit/{id}")).into_response())
            }
            None => Err(e.into()),
        },
    }
}

/// Delete a product and every order line that references it.
#[instrument(skip(state, session))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Redirect> {
    CatalogService::new(state.pool(), &state.config().upload_dir)
        .delete(ProductId::new(id))
        .await?;

    push_flash(&session, Flash::success("Product deleted successfully!")).await?;
    Ok(Redirect::to("/admin"))
}
