//! User domain types.

use chrono::{DateTime, Utc};

use greengrocer_core::{Role, UserId, Username};

/// A storefront account (domain type).
///
/// Customers and admins share the table; `role` decides which login form
/// accepts the credentials.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique username.
    pub username: Username,
    /// Customer or admin.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
