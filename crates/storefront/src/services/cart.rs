//! Cart service.
//!
//! Each (user, product) pair has at most one line. Adding merges into the
//! existing line; quantity changes step by one and never drop below 1.

use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;

use greengrocer_core::{OrderLineId, ProductId};

use crate::db::{OrderLineRepository, ProductRepository, RepositoryError};
use crate::models::{CartSummary, OrderLine, Principal};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Product or line does not exist.
    #[error("not found")]
    NotFound,

    /// The line belongs to another user.
    #[error("order line belongs to another user")]
    NotOwner,

    /// Quantity below 1.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The line would hold more than `OrderLine::MAX_QUANTITY` units.
    #[error("a cart line can hold at most {} units", OrderLine::MAX_QUANTITY)]
    TooMany,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Direction of a single-step quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Adjustment {
    Increase,
    Decrease,
}

impl Adjustment {
    const fn delta(self) -> i64 {
        match self {
            Self::Increase => 1,
            Self::Decrease => -1,
        }
    }
}

/// Cart service scoped to one request.
pub struct CartService<'a> {
    lines: OrderLineRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            lines: OrderLineRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// Add `quantity` of a product to the principal's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` if `quantity < 1`,
    /// `CartError::TooMany` if the line would exceed
    /// `OrderLine::MAX_QUANTITY` (the existing line is left as it was), and
    /// `CartError::NotFound` if the product does not exist.
    pub async fn add(
        &self,
        principal: &Principal,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<OrderLine, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }
        if quantity > OrderLine::MAX_QUANTITY {
            return Err(CartError::TooMany);
        }

        if self.products.get_by_id(product_id).await?.is_none() {
            return Err(CartError::NotFound);
        }

        let line = self
            .lines
            .add_or_merge(principal.user_id, product_id, quantity)
            .await?
            .ok_or(CartError::TooMany)?;

        tracing::debug!(
            user_id = %principal.user_id,
            product_id = %product_id,
            quantity = line.quantity,
            "Cart line updated"
        );

        Ok(line)
    }

    /// All of the principal's lines with totals.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn list(&self, principal: &Principal) -> Result<CartSummary, CartError> {
        let rows = self.lines.list_for_user(principal.user_id).await?;
        Ok(CartSummary::new(rows))
    }

    /// Step a line's quantity up or down by one (floor 1).
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotFound` for an unknown line and
    /// `CartError::NotOwner` for another user's line.
    pub async fn adjust(
        &self,
        principal: &Principal,
        line_id: OrderLineId,
        adjustment: Adjustment,
    ) -> Result<OrderLine, CartError> {
        match self
            .lines
            .adjust_quantity(principal.user_id, line_id, adjustment.delta())
            .await?
        {
            Some(line) => Ok(line),
            None => Err(self.explain_miss(line_id).await),
        }
    }

    /// Delete one of the principal's lines.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotFound` for an unknown line and
    /// `CartError::NotOwner` for another user's line.
    pub async fn remove(&self, principal: &Principal, line_id: OrderLineId) -> Result<(), CartError> {
        if self.lines.delete_for_user(principal.user_id, line_id).await? {
            return Ok(());
        }
        Err(self.explain_miss(line_id).await)
    }

    /// Distinguish a missing line from someone else's line.
    async fn explain_miss(&self, line_id: OrderLineId) -> CartError {
        match self.lines.get_by_id(line_id).await {
            Ok(Some(_)) => CartError::NotOwner,
            Ok(None) => CartError::NotFound,
            Err(e) => CartError::Repository(e),
        }
    }
}
