//! Cart and order line domain types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use greengrocer_core::{OrderLineId, Price, ProductId, UserId};

use super::Product;

/// One (user, product) line: a cart entry until checkout stamps it.
#[derive(Debug, Clone)]
pub struct OrderLine {
    /// Unique line ID.
    pub id: OrderLineId,
    /// Owner of the line.
    pub user_id: UserId,
    /// Product being ordered.
    pub product_id: ProductId,
    /// Between 1 and [`OrderLine::MAX_QUANTITY`].
    pub quantity: i64,
    /// Set at checkout.
    pub customer_name: Option<String>,
    /// Set at checkout.
    pub address: Option<String>,
    /// Set at checkout.
    pub mobile: Option<String>,
    /// Set at checkout.
    pub payment_method: Option<String>,
    /// When the line was first added.
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    /// Most units one line can hold; matches the `order_lines.quantity` check.
    pub const MAX_QUANTITY: i64 = 10_000;

    /// Whether checkout has stamped shipping details on this line.
    #[must_use]
    pub const fn is_checked_out(&self) -> bool {
        self.customer_name.is_some()
    }
}

/// A cart line joined with its current product data.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub line: OrderLine,
    pub product: Product,
    /// `product.price * line.quantity`
    pub total: Price,
}

/// All of one user's lines with the grand total.
#[derive(Debug, Clone, Default)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub total: Price,
}

impl CartSummary {
    /// Build a summary, computing line and grand totals.
    #[must_use]
    pub fn new(rows: Vec<(OrderLine, Product)>) -> Self {
        let lines: Vec<CartLine> = rows
            .into_iter()
            .map(|(line, product)| CartLine {
                total: product.price.line_total(line.quantity),
                line,
                product,
            })
            .collect();
        let total = lines
            .iter()
            .fold(Price::zero(), |acc, l| acc.plus(&l.total));

        Self { lines, total }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.line.quantity).sum()
    }
}

/// An order line as shown on the admin orders page.
#[derive(Debug, Clone)]
pub struct AdminOrderRow {
    pub line: OrderLine,
    pub product_name: String,
    pub username: String,
    pub total: Price,
}

impl AdminOrderRow {
    #[must_use]
    pub fn new(line: OrderLine, product: &Product, username: String) -> Self {
        Self {
            total: product.price.line_total(line.quantity),
            product_name: product.name.clone(),
            username,
            line,
        }
    }
}

/// Shipping details submitted at checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct ShippingInfo {
    pub name: String,
    pub address: String,
    pub mobile: String,
    pub payment: String,
}
