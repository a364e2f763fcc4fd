//! Account roles.

use serde::{Deserialize, Serialize};

/// Role of an account. The numeric id is stored in `users.role_id` and
/// carried in the `role` token claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Member,
    TelegramMember,
}

impl Role {
    /// Convert to the database/claim representation.
    pub fn id(self) -> i32 {
        match self {
            Self::Admin => 1,
            Self::Member => 2,
            Self::TelegramMember => 3,
        }
    }

    /// Convert from the database/claim representation.
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::Admin),
            2 => Some(Self::Member),
            3 => Some(Self::TelegramMember),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
            Self::TelegramMember => "telegram",
        }
    }

    /// Check a raw role claim against an allow-list.
    pub fn is_allowed(role_id: i32, allowed: &[Role]) -> bool {
        allowed.iter().any(|r| r.id() == role_id)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(1, Some(Role::Admin))]
    #[test_case(2, Some(Role::Member))]
    #[test_case(3, Some(Role::TelegramMember))]
    #[test_case(0, None)]
    #[test_case(42, None)]
    fn from_id(id: i32, expected: Option<Role>) {
        assert_eq!(Role::from_id(id), expected);
    }

    #[test]
    fn allow_list() {
        assert!(Role::is_allowed(1, &[Role::Admin]));
        assert!(!Role::is_allowed(2, &[Role::Admin]));
        assert!(!Role::is_allowed(99, &[Role::Admin, Role::Member]));
    }
}
