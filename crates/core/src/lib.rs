//! Greengrocer Core - Shared types library.
//!
//! This crate provides common types used across all Greengrocer components:
//! - `storefront` - Vegetable shop with cart, checkout and admin panel
//! - `login` - Standalone username/password registration demo
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no database access,
//! no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, usernames, password
//!   digests, prices, roles and image filenames

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
