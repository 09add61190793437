//! Domain models for storefront.
//!
//! Validated domain types, separate from the sqlx row types in `db`.

pub mod order_line;
pub mod product;
pub mod session;
pub mod user;

pub use order_line::{AdminOrderRow, CartLine, CartSummary, OrderLine, ShippingInfo};
pub use product::Product;
pub use session::{Flash, FlashLevel, Principal, keys as session_keys};
pub use user::User;
