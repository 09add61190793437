//! Session-related types.
//!
//! Types stored in the session for authentication state and one-shot notices.

use serde::{Deserialize, Serialize};

use greengrocer_core::{Role, UserId, Username};

/// Session-stored identity of the logged-in account.
///
/// Absent from the session when the visitor is anonymous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Account database ID.
    pub user_id: UserId,
    /// Account username.
    pub username: Username,
    /// Customer or admin.
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Severity of a flash notice, mapped to a CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashLevel {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

/// A notice shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Warning,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Danger,
            message: message.into(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in principal.
    pub const PRINCIPAL: &str = "principal";

    /// Key for the pending flash notice.
    pub const FLASH: &str = "flash";
}
