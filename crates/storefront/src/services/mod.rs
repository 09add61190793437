//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Registration, password login and admin bootstrap
//! - `gate` - Role policies evaluated against the session principal
//! - `cart` - Merge-on-add cart lines owned by one user
//! - `checkout` - Stamping shipping details onto every cart line
//! - `catalog` - Admin product management and image uploads
//!
//! Services borrow the pool and wrap repositories; they never touch HTTP types.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod gate;
