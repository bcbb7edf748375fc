//! User types.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use turbo_commerce::ids::UserId;

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular customer.
    #[default]
    Customer,
    /// Store staff with limited admin access.
    Staff,
    /// Store administrator.
    Admin,
    /// Super admin with full access.
    SuperAdmin,
}

impl Role {
    /// Get role as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Staff => "staff",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Check if this role has at least the given permission level.
    pub fn has_permission(&self, required: Role) -> bool {
        self.level() >= required.level()
    }

    /// Get permission level (higher = more permissions).
    pub fn level(&self) -> u8 {
        match self {
            Role::Customer => 0,
            Role::Staff => 1,
            Role::Admin => 2,
            Role::SuperAdmin => 3,
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// A user attached to a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum User {
    /// Guest user.
    Anonymous,
    /// Authenticated user.
    Authenticated {
        /// User ID.
        id: UserId,
        /// Email address.
        email: String,
        /// User roles.
        roles: Vec<Role>,
    },
}

impl User {
    /// Create a new authenticated user.
    pub fn authenticated(id: UserId, email: impl Into<String>, roles: Vec<Role>) -> Self {
        User::Authenticated {
            id,
            email: email.into(),
            roles,
        }
    }

    /// Check if user is authenticated.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, User::Authenticated { .. })
    }

    /// Get user ID if authenticated.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            User::Authenticated { id, .. } => Some(id),
            User::Anonymous => None,
        }
    }

    /// Get email if authenticated.
    pub fn email(&self) -> Option<&str> {
        match self {
            User::Authenticated { email, .. } => Some(email),
            User::Anonymous => None,
        }
    }

    /// Get roles.
    pub fn roles(&self) -> &[Role] {
        match self {
            User::Authenticated { roles, .. } => roles,
            User::Anonymous => &[],
        }
    }

    /// Check if user has at least the given permission level.
    pub fn has_permission(&self, required: Role) -> bool {
        self.roles().iter().any(|r| r.has_permission(required))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.has_permission(Role::Customer));
        assert!(Role::Admin.has_permission(Role::Staff));
        assert!(Role::Admin.has_permission(Role::Admin));
        assert!(!Role::Admin.has_permission(Role::SuperAdmin));
        assert!(!Role::Staff.has_permission(Role::Admin));
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("super_admin".parse::<Role>(), Ok(Role::SuperAdmin));
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_user_permissions() {
        let admin = User::authenticated(UserId::new("usr_admin"), "admin@example.com", vec![Role::Admin]);
        assert!(admin.is_authenticated());
        assert_eq!(admin.email(), Some("admin@example.com"));
        assert!(admin.has_permission(Role::Staff));
        assert!(!admin.has_permission(Role::SuperAdmin));

        assert!(!User::Anonymous.has_permission(Role::Customer));
        assert!(User::Anonymous.user_id().is_none());
    }
}
