//! API-side authorization guard for admin actions.
//!
//! Checked in the handler before any action runs; actions themselves stay
//! auth-agnostic.

use axum::http::StatusCode;
use axum::response::Response;

use vitrina_auth::{authorize, ActionAuthorization, AuthzError, Permission};

use crate::app::errors::json_error;
use crate::context::PrincipalContext;

/// Permissions an admin route needs.
pub struct Requires<'a>(pub &'a [Permission]);

impl ActionAuthorization for Requires<'_> {
    fn required_permissions(&self) -> &[Permission] {
        self.0
    }
}

pub fn authorize_action<A: ActionAuthorization>(principal: &PrincipalContext, action: &A) -> Result<(), AuthzError> {
    let principal = principal.principal();
    for perm in action.required_permissions() {
        authorize(&principal, perm)?;
    }
    Ok(())
}

/// `authorize_action` with the failure already rendered as a 403.
pub fn require(principal: &PrincipalContext, permissions: &[Permission]) -> Result<(), Response> {
    authorize_action(principal, &Requires(permissions))
        .map_err(|e| json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()))
}

#[cfg(test)]
mod tests {
    use vitrina_auth::Role;
    use vitrina_core::UserId;

    use super::*;

    #[test]
    fn editor_is_limited_to_catalog() {
        let editor = PrincipalContext::new(UserId::new(), "e@tienda.es", vec![Role::EDITOR]);
        assert!(authorize_action(&editor, &Requires(&[Permission::CATALOG_WRITE])).is_ok());
        assert!(require(&editor, &[Permission::USERS_WRITE]).is_err());

        let admin = PrincipalContext::new(UserId::new(), "a@tienda.es", vec![Role::ADMIN]);
        assert!(authorize_action(&admin, &Requires(&[Permission::USERS_WRITE, Permission::DASHBOARD_READ])).is_ok());
    }
}
