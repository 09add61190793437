//! Authorization gate.
//!
//! Pure policy evaluation over the session principal. The HTTP mapping of a
//! denial (which redirect, which notice) lives in `middleware::auth`.

use crate::models::Principal;

/// Access policy attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Any logged-in account.
    Authenticated,
    /// Logged-in admin only.
    Admin,
    /// Logged-in customer only; admins are bounced.
    Shopper,
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No principal in the session.
    Unauthenticated,
    /// Admin policy without an admin principal.
    Forbidden,
    /// Admin principal on a shopper-only action.
    AdminShopper,
}

/// Outcome of evaluating a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(Principal),
    Deny(DenyReason),
}

/// Evaluate `policy` for the given principal.
#[must_use]
pub fn evaluate(policy: Policy, principal: Option<&Principal>) -> Decision {
    match (policy, principal) {
        (Policy::Admin, Some(p)) if p.is_admin() => Decision::Allow(p.clone()),
        (Policy::Admin, _) => Decision::Deny(DenyReason::Forbidden),
        (_, None) => Decision::Deny(DenyReason::Unauthenticated),
        (Policy::Shopper, Some(p)) if p.is_admin() => Decision::Deny(DenyReason::AdminShopper),
        (Policy::Authenticated | Policy::Shopper, Some(p)) => Decision::Allow(p.clone()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use greengrocer_core::{Role, UserId, Username};

    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            user_id: UserId::new(1),
            username: Username::parse("someone").unwrap(),
            role,
        }
    }

    #[test]
    fn test_anonymous() {
        assert_eq!(
            evaluate(Policy::Authenticated, None),
            Decision::Deny(DenyReason::Unauthenticated)
        );
        assert_eq!(
            evaluate(Policy::Shopper, None),
            Decision::Deny(DenyReason::Unauthenticated)
        );
        assert_eq!(
            evaluate(Policy::Admin, None),
            Decision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn test_customer() {
        let customer = principal(Role::Customer);
        assert_eq!(
            evaluate(Policy::Authenticated, Some(&customer)),
            Decision::Allow(customer.clone())
        );
        assert_eq!(
            evaluate(Policy::Shopper, Some(&customer)),
            Decision::Allow(customer.clone())
        );
        assert_eq!(
            evaluate(Policy::Admin, Some(&customer)),
            Decision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn test_admin() {
        let admin = principal(Role::Admin);
        assert_eq!(
            evaluate(Policy::Admin, Some(&admin)),
            Decision::Allow(admin.clone())
        );
        assert_eq!(
            evaluate(Policy::Authenticated, Some(&admin)),
            Decision::Allow(admin.clone())
        );
        assert_eq!(
            evaluate(Policy::Shopper, Some(&admin)),
            Decision::Deny(DenyReason::AdminShopper)
        );
    }
}
