//! Cart route handlers.
//!
//! The cart is the set of the shopper's order lines. Quantity changes are
//! plain form posts; the cart script submits them in the background and
//! reloads the page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use greengrocer_core::{OrderLineId, ProductId};

use crate::error::Result;
use crate::filters;
use crate::middleware::{Page, RequireAuth, RequireShopper, push_flash};
use crate::models::{CartLine, CartSummary, Flash, OrderLine};
use crate::services::cart::{Adjustment, CartError, CartService};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub image_url: String,
    pub quantity: i64,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: i64,
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.line.id.as_i64(),
            product_id: line.product.id.as_i64(),
            name: line.product.name.clone(),
            image_url: line.product.image_url(),
            quantity: line.line.quantity,
            price: line.product.price.to_string(),
            line_price: line.total.to_string(),
        }
    }
}

impl From<&CartSummary> for CartView {
    fn from(summary: &CartSummary) -> Self {
        Self {
            items: summary.lines.iter().map(CartItemView::from).collect(),
            total: summary.total.to_string(),
            item_count: summary.item_count(),
        }
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Add-to-cart form. A missing quantity means one.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub quantity: Option<String>,
}

impl AddToCartForm {
    fn quantity(&self) -> Option<i64> {
        match self.quantity.as_deref().map(str::trim) {
            None | Some("") => Some(1),
            Some(raw) => raw.parse().ok(),
        }
    }
}

/// Quantity step form.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub action: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub page: Page,
    pub cart: CartView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn show(
    State(state): State<AppState>,
    RequireShopper(principal): RequireShopper,
    page: Page,
) -> Result<CartTemplate> {
    let summary = CartService::new(state.pool()).list(&principal).await?;

    Ok(CartTemplate {
        page,
        cart: CartView::from(&summary),
    })
}

/// Add a product to the cart, merging with an existing line.
#[instrument(skip(state, session, principal, form))]
pub async fn add(
    State(state): State<AppState>,
    RequireShopper(principal): RequireShopper,
    session: Session,
    Path(product_id): Path<i64>,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let cart = CartService::new(state.pool());
    let product_url = format!("/product/{product_id}");

    let Some(quantity) = form.quantity() else {
        push_flash(&session, Flash::danger("Quantity must be a whole number")).await?;
        return Ok(Redirect::to(&product_url).into_response());
    };

    match cart.add(&principal, ProductId::new(product_id), quantity).await {
        Ok(_) => {
            push_flash(&session, Flash::success("Product added to cart")).await?;
            Ok(Redirect::to("/cart").into_response())
        }
        Err(CartError::InvalidQuantity) => {
            push_flash(&session, Flash::danger("Quantity must be at least 1")).await?;
            Ok(Redirect::to(&product_url).into_response())
        }
        Err(CartError::TooMany) => {
            push_flash(
                &session,
                Flash::danger(format!(
                    "You can add at most {} of one product",
                    OrderLine::MAX_QUANTITY
                )),
            )
            .await?;
            Ok(Redirect::to(&product_url).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Step a line's quantity up or down.
///
/// Another user's line is left untouched and the request is sent back to
/// the cart without a notice. Unknown actions change nothing.
#[instrument(skip(state, principal, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(line_id): Path<i64>,
    Form(form): Form<UpdateCartForm>,
) -> Result<Redirect> {
    let adjustment = match form.action.as_str() {
        "increase" => Adjustment::Increase,
        "decrease" => Adjustment::Decrease,
        other => {
            tracing::debug!(action = other, "Ignoring unknown cart action");
            return Ok(Redirect::to("/cart"));
        }
    };

    let cart = CartService::new(state.pool());
    match cart
        .adjust(&principal, OrderLineId::new(line_id), adjustment)
        .await
    {
        Ok(_) | Err(CartError::NotOwner) => Ok(Redirect::to("/cart")),
        Err(e) => Err(e.into()),
    }
}

/// Delete a line from the cart.
#[instrument(skip(state, session, principal))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    session: Session,
    Path(line_id): Path<i64>,
) -> Result<Redirect> {
    let cart = CartService::new(state.pool());
    match cart.remove(&principal, OrderLineId::new(line_id)).await {
        Ok(()) => {
            push_flash(&session, Flash::success("Item removed")).await?;
            Ok(Redirect::to("/cart"))
        }
        Err(CartError::NotOwner) => Ok(Redirect::to("/cart")),
        Err(e) => Err(e.into()),
    }
}
