//! user type representing an end user or administrator.

use serde::{Deserialize, Serialize};

/// unique identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// persisted role of a user.
///
/// the stored form is `"end user"` (with a space) for regular users and
/// `"admin"` for administrators. parsing lowercases and trims, so legacy
/// rows with stray casing still resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// a regular user who places and withdraws orders.
    #[default]
    #[serde(rename = "end user")]
    EndUser,
    /// an administrator with access to the fleet surface.
    Admin,
}

impl Role {
    /// the stored string form of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::EndUser => "end user",
            Role::Admin => "admin",
        }
    }

    /// parse a stored role string, lowercasing and trimming first.
    /// unknown values resolve to [`Role::EndUser`].
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "admin" => Role::Admin,
            _ => Role::EndUser,
        }
    }

    /// whether this role grants the admin surface.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// a skycourier user.
///
/// users are created when they first place an order or seeded through the
/// cli; the role is only ever changed by the admin flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// unique identifier.
    pub id: UserId,

    /// username - unique, case-sensitive.
    pub username: String,

    /// persisted role, defaults to end user.
    pub role: Role,
}

impl User {
    /// create a new user with the given username and the default role.
    pub fn new(id: UserId, username: String) -> Self {
        Self {
            id,
            username,
            role: Role::EndUser,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("end user"), Role::EndUser);
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::EndUser.as_str(), "end user");
    }

    #[test]
    fn test_role_parse_is_lenient() {
        assert_eq!(Role::parse("  Admin "), Role::Admin);
        assert_eq!(Role::parse("ADMIN"), Role::Admin);
        // unknown roles degrade to the least-privileged kind
        assert_eq!(Role::parse("superuser"), Role::EndUser);
        assert_eq!(Role::parse(""), Role::EndUser);
    }

    #[test]
    fn test_new_user_defaults() {
        let user = User::new(UserId(0), "alice".to_string());
        assert_eq!(user.role, Role::EndUser);
        assert!(!user.role.is_admin());
    }
}
