//! Order line (cart) repository.
//!
//! A line is unique per (user, product). Adds merge through an atomic
//! `ON CONFLICT` upsert and quantity changes are single conditional updates,
//! so no read-modify-write window exists.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use greengrocer_core::{OrderLineId, ProductId, UserId};

use super::RepositoryError;
use super::products::ProductRow;
use crate::models::{OrderLine, Product};

const LINE_COLUMNS: &str = "id, user_id, product_id, quantity, customer_name, address, mobile, payment_method, created_at";

/// Raw `order_lines` row.
#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    id: i64,
    user_id: i64,
    product_id: i64,
    quantity: i64,
    customer_name: Option<String>,
    address: Option<String>,
    mobile: Option<String>,
    payment_method: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = RepositoryError;

    fn try_from(row: OrderLineRow) -> Result<Self, Self::Error> {
        if !(1..=OrderLine::MAX_QUANTITY).contains(&row.quantity) {
            return Err(RepositoryError::DataCorruption(format!(
                "order line {} has quantity {}",
                row.id, row.quantity
            )));
        }

        Ok(Self {
            id: OrderLineId::new(row.id),
            user_id: UserId::new(row.user_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            customer_name: row.customer_name,
            address: row.address,
            mobile: row.mobile,
            payment_method: row.payment_method,
            created_at: row.created_at,
        })
    }
}

/// Order line joined with its product (and owner, for admin listings).
#[derive(Debug, sqlx::FromRow)]
struct JoinedRow {
    #[sqlx(flatten)]
    line: OrderLineRow,
    product_name: String,
    product_price: String,
    product_image: String,
    product_created_at: DateTime<Utc>,
    #[sqlx(default)]
    username: Option<String>,
}

impl JoinedRow {
    fn split(self) -> Result<(OrderLine, Product, Option<String>), RepositoryError> {
        let product = Product::try_from(ProductRow {
            id: self.line.product_id,
            name: self.product_name,
            price: self.product_price,
            image: self.product_image,
            created_at: self.product_created_at,
        })?;
        let line = OrderLine::try_from(self.line)?;
        Ok((line, product, self.username))
    }
}

/// Validated shipping fields written at checkout.
#[derive(Debug, Clone, Copy)]
pub struct ShippingStamp<'a> {
    pub customer_name: &'a str,
    pub address: &'a str,
    pub mobile: &'a str,
    pub payment_method: &'a str,
}

/// Repository for cart and order line operations.
pub struct OrderLineRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderLineRepository<'a> {
    /// Create a new order line repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add `quantity` units of a product to a user's cart.
    ///
    /// Creates the line on first add; later adds increase its quantity.
    /// Returns `None`, leaving the line unchanged, when the merged quantity
    /// would exceed [`OrderLine::MAX_QUANTITY`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails (including an
    /// unknown product, which violates the foreign key, or a `quantity`
    /// outside the column check).
    pub async fn add_or_merge(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Option<OrderLine>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderLineRow>(&format!(
            r"
            INSERT INTO order_lines (user_id, product_id, quantity)
            VALUES (?, ?, ?)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = order_lines.quantity + excluded.quantity,
                          updated_at = CURRENT_TIMESTAMP
            WHERE order_lines.quantity + excluded.quantity <= ?
            RETURNING {LINE_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .bind(OrderLine::MAX_QUANTITY)
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderLine::try_from).transpose()
    }

    /// Get a line by ID regardless of owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderLineId) -> Result<Option<OrderLine>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderLineRow>(&format!(
            "SELECT {LINE_COLUMNS} FROM order_lines WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderLine::try_from).transpose()
    }

    /// List a user's lines with product data, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<(OrderLine, Product)>, RepositoryError> {
        let rows = sqlx::query_as::<_, JoinedRow>(
            r"
            SELECT o.id, o.user_id, o.product_id, o.quantity, o.customer_name,
                   o.address, o.mobile, o.payment_method, o.created_at,
                   p.name AS product_name, p.price AS product_price,
                   p.image AS product_image, p.created_at AS product_created_at
            FROM order_lines o
            JOIN products p ON p.id = o.product_id
            WHERE o.user_id = ?
            ORDER BY o.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.split().map(|(line, product, _)| (line, product)))
            .collect()
    }

    /// List every line with product and owner, for the admin orders page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all_with_details(
        &self,
    ) -> Result<Vec<(OrderLine, Product, String)>, RepositoryError> {
        let rows = sqlx::query_as::<_, JoinedRow>(
            r"
            SELECT o.id, o.user_id, o.product_id, o.quantity, o.customer_name,
                   o.address, o.mobile, o.payment_method, o.created_at,
                   p.name AS product_name, p.price AS product_price,
                   p.image AS product_image, p.created_at AS product_created_at,
                   u.username AS username
            FROM order_lines o
            JOIN products p ON p.id = o.product_id
            JOIN users u ON u.id = o.user_id
            ORDER BY o.id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                row.split()
                    .map(|(line, product, username)| (line, product, username.unwrap_or_default()))
            })
            .collect()
    }

    /// Change a user's line quantity by `delta`, clamped to
    /// `1..=OrderLine::MAX_QUANTITY`.
    ///
    /// Returns `None` when no line with this ID belongs to the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn adjust_quantity(
        &self,
        user_id: UserId,
        id: OrderLineId,
        delta: i64,
    ) -> Result<Option<OrderLine>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderLineRow>(&format!(
            r"
            UPDATE order_lines
            SET quantity = MIN(MAX(quantity + ?, 1), ?),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND user_id = ?
            RETURNING {LINE_COLUMNS}
            "
        ))
        .bind(delta)
        .bind(OrderLine::MAX_QUANTITY)
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderLine::try_from).transpose()
    }

    /// Delete a user's line. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_for_user(
        &self,
        user_id: UserId,
        id: OrderLineId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM order_lines WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stamp every line of a user with the same shipping details.
    ///
    /// Runs in one transaction. Returns the stamped lines, or an empty list
    /// when the user has no lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction is rolled back.
    pub async fn stamp_all_for_user(
        &self,
        user_id: UserId,
        stamp: ShippingStamp<'_>,
    ) -> Result<Vec<OrderLine>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query_as::<_, OrderLineRow>(&format!(
            r"
            UPDATE order_lines
            SET customer_name = ?, address = ?, mobile = ?, payment_method = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE user_id = ?
            RETURNING {LINE_COLUMNS}
            "
        ))
        .bind(stamp.customer_name)
        .bind(stamp.address)
        .bind(stamp.mobile)
        .bind(stamp.payment_method)
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        let mut lines = rows
            .into_iter()
            .map(OrderLine::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        lines.sort_by_key(|l| l.id);

        tx.commit().await?;

        Ok(lines)
    }

    /// Number of lines a user has.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_user(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_lines WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use greengrocer_core::{ImageFilename, PasswordDigest, Price, Role, Username};

    use super::*;
    use crate::db::products::{ProductInput, ProductRepository};
    use crate::db::test_support;
    use crate::db::users::UserRepository;

    async fn seed(pool: &SqlitePool) -> (UserId, UserId, ProductId) {
        let users = UserRepository::new(pool);
        let hash = PasswordDigest::hash("pw1").unwrap();
        let alice = users
            .create(&Username::parse("alice").unwrap(), &hash, Role::Customer)
            .await
            .unwrap();
        let bob = users
            .create(&Username::parse("bob").unwrap(), &hash, Role::Customer)
            .await
            .unwrap();
        let price = Price::parse("20").unwrap();
        let image = ImageFilename::sanitize("beans.png").unwrap();
        let beans = ProductRepository::new(pool)
            .create(ProductInput {
                name: "Beans",
                price: &price,
                image: &image,
            })
            .await
            .unwrap();
        (alice.id, bob.id, beans.id)
    }

    #[tokio::test]
    async fn test_add_merges_into_one_line() {
        let pool = test_support::pool().await;
        let (alice, _, beans) = seed(&pool).await;
        let repo = OrderLineRepository::new(&pool);

        let first = repo.add_or_merge(alice, beans, 2).await.unwrap().unwrap();
        let second = repo.add_or_merge(alice, beans, 3).await.unwrap().unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity, 5);
        assert_eq!(repo.count_for_user(alice).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_adjust_floors_at_one_and_checks_owner() {
        let pool = test_support::pool().await;
        let (alice, bob, beans) = seed(&pool).await;
        let repo = OrderLineRepository::new(&pool);
        let line = repo.add_or_merge(alice, beans, 2).await.unwrap().unwrap();

        let down = repo.adjust_quantity(alice, line.id, -1).await.unwrap().unwrap();
        assert_eq!(down.quantity, 1);
        let down = repo.adjust_quantity(alice, line.id, -1).await.unwrap().unwrap();
        assert_eq!(down.quantity, 1);

        assert!(repo.adjust_quantity(bob, line.id, 1).await.unwrap().is_none());
        assert!(!repo.delete_for_user(bob, line.id).await.unwrap());
        assert!(repo.delete_for_user(alice, line.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_merge_never_exceeds_max_quantity() {
        let pool = test_support::pool().await;
        let (alice, _, beans) = seed(&pool).await;
        let repo = OrderLineRepository::new(&pool);

        let full = repo
            .add_or_merge(alice, beans, OrderLine::MAX_QUANTITY)
            .await
            .unwrap()
            .unwrap();
        assert!(repo.add_or_merge(alice, beans, 1).await.unwrap().is_none());

        let up = repo.adjust_quantity(alice, full.id, 1).await.unwrap().unwrap();
        assert_eq!(up.quantity, OrderLine::MAX_QUANTITY);

        let lines = repo.list_for_user(alice).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0.quantity, OrderLine::MAX_QUANTITY);
    }

    #[tokio::test]
    async fn test_out_of_range_insert_is_refused() {
        let pool = test_support::pool().await;
        let (alice, _, beans) = seed(&pool).await;
        let repo = OrderLineRepository::new(&pool);

        assert!(repo.add_or_merge(alice, beans, i64::MAX).await.is_err());
        assert!(repo.list_for_user(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stamp_empty_cart_writes_nothing() {
        let pool = test_support::pool().await;
        let (alice, _, _) = seed(&pool).await;
        let repo = OrderLineRepository::new(&pool);

        let stamped = repo
            .stamp_all_for_user(
                alice,
                ShippingStamp {
                    customer_name: "Alice",
                    address: "1 Farm Rd",
                    mobile: "9999999999",
                    payment_method: "COD",
                },
            )
            .await
            .unwrap();
        assert!(stamped.is_empty());
    }

    #[tokio::test]
    async fn test_product_delete_cascades() {
        let pool = test_support::pool().await;
        let (alice, _, beans) = seed(&pool).await;
        let repo = OrderLineRepository::new(&pool);
        repo.add_or_merge(alice, beans, 1).await.unwrap();

        ProductRepository::new(&pool).delete(beans).await.unwrap();
        assert_eq!(repo.count_for_user(alice).await.unwrap(), 0);
    }
}
