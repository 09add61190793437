//! Checkout route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{Page, RequireAuth, RequireShopper, push_flash};
use crate::models::{Flash, ShippingInfo};
use crate::routes::cart::CartView;
use crate::services::cart::CartService;
use crate::services::checkout::{CheckoutError, CheckoutService};
use crate::state::AppState;

/// Payment options offered on the checkout form.
pub const PAYMENT_METHODS: &[&str] = &["COD", "UPI", "Card"];

const EMPTY_CART_NOTICE: &str = "Your cart is empty";

/// Checkout page template: order summary and shipping form.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub page: Page,
    pub cart: CartView,
    pub payment_methods: &'static [&'static str],
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "order_success.html")]
pub struct OrderSuccessTemplate {
    pub page: Page,
}

/// Display the checkout form, or bounce back to an empty cart.
#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn show(
    State(state): State<AppState>,
    RequireShopper(principal): RequireShopper,
    session: Session,
    page: Page,
) -> Result<Response> {
    let summary = CartService::new(state.pool()).list(&principal).await?;

    if summary.is_empty() {
        push_flash(&session, Flash::warning(EMPTY_CART_NOTICE)).await?;
        return Ok(Redirect::to("/cart").into_response());
    }

    Ok(CheckoutTemplate {
        page,
        cart: CartView::from(&summary),
        payment_methods: PAYMENT_METHODS,
    }
    .into_response())
}

/// Stamp the shipping details onto every cart line.
#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn submit(
    State(state): State<AppState>,
    RequireShopper(principal): RequireShopper,
    session: Session,
    Form(info): Form<ShippingInfo>,
) -> Result<Redirect> {
    let checkout = CheckoutService::new(state.pool());

    let (flash, target) = match checkout.finalize(&principal, &info).await {
        Ok(_) => (Flash::success("Order placed successfully!"), "/order-success"),
        Err(CheckoutError::EmptyCart) => (Flash::warning(EMPTY_CART_NOTICE), "/cart"),
        Err(CheckoutError::InvalidShipping(message)) => (Flash::danger(message), "/checkout"),
        Err(e) => return Err(e.into()),
    };

    push_flash(&session, flash).await?;
    Ok(Redirect::to(target))
}

/// Display the order confirmation.
pub async fn success(RequireAuth(_principal): RequireAuth, page: Page) -> OrderSuccessTemplate {
    OrderSuccessTemplate { page }
}
