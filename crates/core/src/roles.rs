//! Well-known role name constants and the role enum.
//!
//! Identity resolution happens outside the engine; the role travels in on
//! the opaque current-user descriptor.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MEMBER: &str = "member";

/// Role carried by the current-user descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    /// Return the wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::Member => ROLE_MEMBER,
        }
    }

    /// Parse from a string, returning an error for unknown roles.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            ROLE_ADMIN => Ok(Self::Admin),
            ROLE_MEMBER => Ok(Self::Member),
            other => Err(CoreError::Validation(format!(
                "Unknown role: '{other}'. Valid roles: {ROLE_ADMIN}, {ROLE_MEMBER}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trip() {
        assert_eq!(Role::from_str(Role::Admin.as_str()).unwrap(), Role::Admin);
        assert_eq!(Role::from_str(Role::Member.as_str()).unwrap(), Role::Member);
    }

    #[test]
    fn unknown_role_rejected() {
        assert!(Role::from_str("superuser").is_err());
        assert!(Role::from_str("").is_err());
    }
}
