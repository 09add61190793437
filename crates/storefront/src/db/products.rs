//! Product (catalog) repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use greengrocer_core::{ImageFilename, Price, ProductId};

use super::RepositoryError;
use crate::models::Product;

/// Raw `products` row.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) price: String,
    pub(crate) image: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::parse(&row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!(
                "invalid price {:?} for product {}: {e}",
                row.price, row.id
            ))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            price,
            image: ImageFilename::from_stored(row.image),
            created_at: row.created_at,
        })
    }
}

/// Fields written on create and update.
#[derive(Debug, Clone)]
pub struct ProductInput<'a> {
    pub name: &'a str,
    pub price: &'a Price,
    pub image: &'a ImageFilename,
}

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List every product in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored price is invalid.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, price, image, created_at FROM products ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, price, image, created_at FROM products WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Whether a product with exactly this name exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn name_exists(&self, name: &str) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE name = ?)")
                .bind(name)
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: ProductInput<'_>) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products (name, price, image)
            VALUES (?, ?, ?)
            RETURNING id, name, price, image, created_at
            ",
        )
        .bind(input.name)
        .bind(input.price.to_storage())
        .bind(input.image.as_str())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Overwrite a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        input: ProductInput<'_>,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE products
            SET name = ?, price = ?, image = ?
            WHERE id = ?
            RETURNING id, name, price, image, created_at
            ",
        )
        .bind(input.name)
        .bind(input.price.to_storage())
        .bind(input.image.as_str())
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete a product; its order lines are removed by the foreign key cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
