use std::collections::HashSet;

use thiserror::Error;

use crate::{Permission, Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorization contract for admin actions.
///
/// The API layer checks these requirements before running the action.
pub trait ActionAuthorization {
    fn required_permissions(&self) -> &[Permission];
}

/// Pure policy check: no IO, no panics.
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    let perms: HashSet<&str> = principal.permissions.iter().map(|p| p.as_str()).collect();

    if perms.contains("*") || perms.contains(required.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Built-in role policy.
///
/// `admin` grants everything; `editor` may maintain the catalog and read the
/// dashboard but not manage users. Unknown roles grant nothing.
pub fn permissions_from_roles(roles: &[Role]) -> Vec<Permission> {
    if roles.iter().any(|r| *r == Role::ADMIN) {
        return vec![Permission::ALL];
    }

    let mut perms = Vec::new();
    if roles.iter().any(|r| *r == Role::EDITOR) {
        perms.extend([
            Permission::CATALOG_READ,
            Permission::CATALOG_WRITE,
            Permission::DASHBOARD_READ,
        ]);
    }
    perms
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrina_core::UserId;

    #[test]
    fn admin_gets_wildcard() {
        let p = Principal::from_roles(UserId::new(), vec![Role::ADMIN]);
        assert!(authorize(&p, &Permission::USERS_WRITE).is_ok());
        assert!(authorize(&p, &Permission::new("anything.else")).is_ok());
    }

    #[test]
    fn editor_cannot_manage_users() {
        let p = Principal::from_roles(UserId::new(), vec![Role::EDITOR]);
        assert!(authorize(&p, &Permission::CATALOG_WRITE).is_ok());
        assert_eq!(
            authorize(&p, &Permission::USERS_WRITE),
            Err(AuthzError::Forbidden("users.write".into()))
        );
    }

    #[test]
    fn unknown_role_grants_nothing() {
        let p = Principal::from_roles(UserId::new(), vec![Role::new("guest")]);
        assert!(p.permissions.is_empty());
        assert!(authorize(&p, &Permission::CATALOG_READ).is_err());
    }
}
