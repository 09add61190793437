//! Core types for Greengrocer.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod image;
pub mod password;
pub mod price;
pub mod role;
pub mod username;

pub use id::*;
pub use image::{
    ALLOWED_IMAGE_EXTENSIONS, ImageFilename, ImageFilenameError, MAX_IMAGE_FILENAME_LENGTH,
};
pub use password::{PasswordDigest, PasswordError};
pub use price::{CurrencyCode, Price, PriceError};
pub use role::Role;
pub use username::{Username, UsernameError};
