//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span)
//! 4. Security headers
//! 5. Session layer (tower-sessions with `SQLite` store)
//!
//! Authorization is not a layer: handlers opt in through the `Require*`
//! extractors in [`auth`].

pub mod auth;
pub mod flash;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAdmin, RequireAuth, RequireShopper, end_session, set_principal};
pub use flash::{Page, push_flash, take_flash};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
