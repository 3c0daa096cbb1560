//! Opaque current-user descriptor.
//!
//! Authentication and session handling live outside the engine; callers
//! resolve the acting user and pass this descriptor into the visibility
//! filters and engine operations.

use serde::{Deserialize, Serialize};

use crate::roles::Role;

/// The acting user, as resolved by the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub username: String,
    pub role: Role,
    pub department: String,
}

impl CurrentUser {
    pub fn new(username: impl Into<String>, role: Role, department: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role,
            department: department.into(),
        }
    }

    /// Whether this user has the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
