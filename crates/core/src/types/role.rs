//! User roles.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role of an account.
///
/// Admin and customer accounts live in the same table but form disjoint
/// credential pools: every lookup filters on the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Shopper registered through the public form.
    #[default]
    Customer,
    /// Catalog manager created by bootstrap.
    Admin,
}

impl Role {
    /// Whether this role grants admin panel access.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Role matching a stored `is_admin` flag.
    #[must_use]
    pub const fn from_admin_flag(is_admin: bool) -> Self {
        if is_admin { Self::Admin } else { Self::Customer }
    }

    /// Lowercase name used in logs and forms.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_flag() {
        assert_eq!(Role::from_admin_flag(true), Role::Admin);
        assert_eq!(Role::from_admin_flag(false), Role::Customer);
        assert!(Role::Admin.is_admin());
        assert!(!Role::Customer.is_admin());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Customer.to_string().parse::<Role>().unwrap(), Role::Customer);
        assert!("root".parse::<Role>().is_err());
    }
}
