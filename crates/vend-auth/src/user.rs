//! User and role types.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use vend_commerce::ids::UserId;

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular buyer.
    #[default]
    Customer,
    /// Store administrator; the only role that may fulfill orders.
    Admin,
}

impl Role {
    /// Get role as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// A user in the system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Email address, stored lower-cased.
    pub email: String,
    /// Display name.
    pub name: Option<String>,
    /// Role.
    pub role: Role,
    /// Unix timestamp of creation.
    pub created_at: i64,
}

impl User {
    /// Create a new user.
    pub fn new(id: UserId, email: impl AsRef<str>, name: Option<String>, role: Role) -> Self {
        Self {
            id,
            email: email.as_ref().trim().to_lowercase(),
            name,
            role,
            created_at: current_timestamp(),
        }
    }

    /// Check if this user may perform admin actions.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("customer".parse::<Role>(), Ok(Role::Customer));
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_email_normalized() {
        let user = User::new(UserId::new("u1"), " Asha@Example.COM ", None, Role::Customer);
        assert_eq!(user.email, "asha@example.com");
        assert!(!user.is_admin());
    }
}
