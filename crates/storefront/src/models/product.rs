//! Catalog product domain type.

use chrono::{DateTime, Utc};

use greengrocer_core::{ImageFilename, Price, ProductId};

/// A product in the catalog.
#[derive(Debug, Clone)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name (1-150 characters).
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Image file under the upload directory.
    pub image: ImageFilename,
    /// When the product was added.
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Maximum length of a product name, in characters.
    pub const MAX_NAME_LENGTH: usize = 150;

    /// Public URL of the product image.
    #[must_use]
    pub fn image_url(&self) -> String {
        format!("/static/images/{}", self.image)
    }
}
