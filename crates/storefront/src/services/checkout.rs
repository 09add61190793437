//! Checkout service.
//!
//! Checkout stamps the same shipping details onto every line of the user's
//! cart in one transaction. There is no payment step and no separate order
//! record; submitting again re-stamps the same lines.

use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::order_lines::ShippingStamp;
use crate::db::{OrderLineRepository, RepositoryError};
use crate::models::{AdminOrderRow, OrderLine, Principal, ShippingInfo};

/// Column limits for the shipping fields.
const MAX_NAME_LENGTH: usize = 150;
const MAX_MOBILE_LENGTH: usize = 15;
const MAX_PAYMENT_LENGTH: usize = 20;

/// Errors from checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The user has no cart lines.
    #[error("cart is empty")]
    EmptyCart,

    /// A shipping field is missing or too long.
    #[error("{0}")]
    InvalidShipping(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Shipping details after trimming and length checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidShipping {
    pub name: String,
    pub address: String,
    pub mobile: String,
    pub payment: String,
}

impl ValidShipping {
    /// Trim and check every field.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidShipping` naming the first bad field.
    pub fn validate(info: &ShippingInfo) -> Result<Self, CheckoutError> {
        Ok(Self {
            name: field("Name", &info.name, Some(MAX_NAME_LENGTH))?,
            address: field("Address", &info.address, None)?,
            mobile: field("Mobile", &info.mobile, Some(MAX_MOBILE_LENGTH))?,
            payment: field("Payment method", &info.payment, Some(MAX_PAYMENT_LENGTH))?,
        })
    }
}

fn field(label: &str, value: &str, max: Option<usize>) -> Result<String, CheckoutError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CheckoutError::InvalidShipping(format!("{label} is required")));
    }
    if let Some(max) = max
        && value.chars().count() > max
    {
        return Err(CheckoutError::InvalidShipping(format!(
            "{label} must be at most {max} characters"
        )));
    }
    Ok(value.to_owned())
}

/// Checkout service scoped to one request.
pub struct CheckoutService<'a> {
    lines: OrderLineRepository<'a>,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            lines: OrderLineRepository::new(pool),
        }
    }

    /// Stamp shipping details onto all of the principal's lines.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` when there is nothing to stamp
    /// (checked before the shipping fields) and
    /// `CheckoutError::InvalidShipping` for bad input; neither writes
    /// anything.
    pub async fn finalize(
        &self,
        principal: &Principal,
        info: &ShippingInfo,
    ) -> Result<Vec<OrderLine>, CheckoutError> {
        if self.lines.count_for_user(principal.user_id).await? == 0 {
            return Err(CheckoutError::EmptyCart);
        }

        let shipping = ValidShipping::validate(info)?;

        let lines = self
            .lines
            .stamp_all_for_user(
                principal.user_id,
                ShippingStamp {
                    customer_name: &shipping.name,
                    address: &shipping.address,
                    mobile: &shipping.mobile,
                    payment_method: &shipping.payment,
                },
            )
            .await?;

        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        tracing::info!(
            user_id = %principal.user_id,
            lines = lines.len(),
            payment_method = %shipping.payment,
            "Checkout completed"
        );

        Ok(lines)
    }

    /// Every order line in the store, oldest first, for the admin panel.
    ///
    /// Includes lines still sitting in carts; `OrderLine::is_checked_out`
    /// tells them apart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Repository` if the query fails.
    pub async fn all_orders(&self) -> Result<Vec<AdminOrderRow>, CheckoutError> {
        let rows = self.lines.list_all_with_details().await?;
        Ok(rows
            .into_iter()
            .map(|(line, product, username)| AdminOrderRow::new(line, &product, username))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use greengrocer_core::{ImageFilename, Price, Role};

    use super::*;
    use crate::db::ProductRepository;
    use crate::db::products::ProductInput;
    use crate::db::test_support;
    use crate::services::auth::AuthService;
    use crate::services::cart::CartService;

    fn info(name: &str, mobile: &str) -> ShippingInfo {
        ShippingInfo {
            name: name.to_owned(),
            address: "12 Market Street".to_owned(),
            mobile: mobile.to_owned(),
            payment: "COD".to_owned(),
        }
    }

    async fn shopper(pool: &SqlitePool) -> Principal {
        let auth = AuthService::new(pool);
        auth.register("alice", "pw1").await.unwrap();
        auth.authenticate("alice", "pw1", Role::Customer).await.unwrap()
    }

    #[test]
    fn test_validate_trims_and_limits() {
        let valid = ValidShipping::validate(&info("  Alice ", "98765")).unwrap();
        assert_eq!(valid.name, "Alice");

        assert!(matches!(
            ValidShipping::validate(&info("   ", "98765")),
            Err(CheckoutError::InvalidShipping(_))
        ));
        assert!(matches!(
            ValidShipping::validate(&info("Alice", &"9".repeat(16))),
            Err(CheckoutError::InvalidShipping(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_cart_changes_nothing() {
        let pool = test_support::pool().await;
        let alice = shopper(&pool).await;

        let err = CheckoutService::new(&pool)
            .finalize(&alice, &info("Alice", "98765"))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));

        let err = CheckoutService::new(&pool)
            .finalize(&alice, &info("   ", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[tokio::test]
    async fn test_finalize_stamps_every_line() {
        let pool = test_support::pool().await;
        let alice = shopper(&pool).await;
        let products = ProductRepository::new(&pool);
        let cart = CartService::new(&pool);
        let price = Price::parse("12").unwrap();
        let image = ImageFilename::sanitize("veg.png").unwrap();

        for name in ["Leek", "Kale"] {
            let product = products
                .create(ProductInput {
                    name,
                    price: &price,
                    image: &image,
                })
                .await
                .unwrap();
            cart.add(&alice, product.id, 1).await.unwrap();
        }

        let lines = CheckoutService::new(&pool)
            .finalize(&alice, &info("Alice", "98765"))
            .await
            .unwrap();
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert!(line.is_checked_out());
            assert_eq!(line.customer_name.as_deref(), Some("Alice"));
            assert_eq!(line.address.as_deref(), Some("12 Market Street"));
            assert_eq!(line.mobile.as_deref(), Some("98765"));
            assert_eq!(line.payment_method.as_deref(), Some("COD"));
        }

        let restamped = CheckoutService::new(&pool)
            .finalize(&alice, &info("Alice B", "98765"))
            .await
            .unwrap();
        assert_eq!(restamped.len(), 2);
        assert_eq!(restamped[0].customer_name.as_deref(), Some("Alice B"));
    }
}
