//! Catalog management service (admin panel).
//!
//! Validates product input, stores uploaded images under the configured
//! upload directory, and writes the catalog rows.

use std::path::Path;

use sqlx::SqlitePool;
use thiserror::Error;

use greengrocer_core::{ImageFilename, ImageFilenameError, Price, PriceError, ProductId};

use crate::db::products::ProductInput;
use crate::db::{ProductRepository, RepositoryError};
use crate::models::Product;

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Product does not exist.
    #[error("product not found")]
    NotFound,

    /// Name empty or too long.
    #[error("invalid product name: {0}")]
    InvalidName(String),

    /// Price not a non-negative decimal.
    #[error("invalid price: {0}")]
    InvalidPrice(#[from] PriceError),

    /// Missing image or disallowed filename.
    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    /// Writing the image failed.
    #[error("failed to store image: {0}")]
    Storage(#[from] std::io::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<ImageFilenameError> for CatalogError {
    fn from(e: ImageFilenameError) -> Self {
        Self::InvalidUpload(e.to_string())
    }
}

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Client-supplied filename, not yet sanitized.
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Browsers submit an empty part when no file was chosen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filename.trim().is_empty() && self.bytes.is_empty()
    }
}

/// Raw admin form input for create and edit.
#[derive(Debug, Clone, Default)]
pub struct ProductSubmission {
    pub name: String,
    pub price: String,
    pub image: Option<ImageUpload>,
}

/// Catalog service scoped to one request.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
    upload_dir: &'a Path,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, upload_dir: &'a Path) -> Self {
        Self {
            products: ProductRepository::new(pool),
            upload_dir,
        }
    }

    /// All products in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.list_all().await?)
    }

    /// One product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist.
    pub async fn get(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.products
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound)
    }

    /// Create a product; an image is required.
    ///
    /// Nothing is written unless every field is valid.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName`, `InvalidPrice` or `InvalidUpload` for bad input.
    pub async fn create(&self, submission: ProductSubmission) -> Result<Product, CatalogError> {
        let name = validate_name(&submission.name)?;
        let price = Price::parse(&submission.price)?;
        let upload = submission
            .image
            .filter(|u| !u.is_empty())
            .ok_or_else(|| CatalogError::InvalidUpload("an image file is required".to_owned()))?;
        let image = ImageFilename::sanitize(&upload.filename)?;

        self.store_image(&image, &upload.bytes).await?;

        let product = self
            .products
            .create(ProductInput {
                name: &name,
                price: &price,
                image: &image,
            })
            .await?;

        tracing::info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Update a product. An absent or empty upload keeps the current image.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown product, or `InvalidName`,
    /// `InvalidPrice` or `InvalidUpload` for bad input.
    pub async fn update(
        &self,
        id: ProductId,
        submission: ProductSubmission,
    ) -> Result<Product, CatalogError> {
        let current = self.get(id).await?;
        let name = validate_name(&submission.name)?;
        let price = Price::parse(&submission.price)?;

        let image = match submission.image.filter(|u| !u.is_empty()) {
            Some(upload) => {
                let image = ImageFilename::sanitize(&upload.filename)?;
                self.store_image(&image, &upload.bytes).await?;
                image
            }
            None => current.image,
        };

        let product = self
            .products
            .update(
                id,
                ProductInput {
                    name: &name,
                    price: &price,
                    image: &image,
                },
            )
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CatalogError::NotFound,
                other => CatalogError::Repository(other),
            })?;

        tracing::info!(product_id = %product.id, "Product updated");
        Ok(product)
    }

    /// Delete a product and (by cascade) every order line referencing it.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown product.
    pub async fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        self.products.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => CatalogError::NotFound,
            other => CatalogError::Repository(other),
        })?;

        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Write image bytes under the upload directory, replacing a same-named file.
    async fn store_image(&self, image: &ImageFilename, bytes: &[u8]) -> Result<(), CatalogError> {
        tokio::fs::create_dir_all(self.upload_dir).await?;
        tokio::fs::write(self.upload_dir.join(image.as_str()), bytes).await?;
        Ok(())
    }
}

fn validate_name(raw: &str) -> Result<String, CatalogError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CatalogError::InvalidName("name is required".to_owned()));
    }
    if name.chars().count() > Product::MAX_NAME_LENGTH {
        return Err(CatalogError::InvalidName(format!(
            "name must be at most {} characters",
            Product::MAX_NAME_LENGTH
        )));
    }
    Ok(name.to_owned())
}
