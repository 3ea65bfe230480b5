use vitrina_core::UserId;

use crate::{Permission, Role};

/// A fully resolved principal for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

impl Principal {
    /// Resolve permissions from roles with the built-in policy.
    pub fn from_roles(user_id: UserId, roles: Vec<Role>) -> Self {
        let permissions = crate::permissions_from_roles(&roles);
        Self { user_id, roles, permissions }
    }
}
