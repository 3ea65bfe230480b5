use vitrina_auth::{Principal, Role};
use vitrina_core::UserId;

/// Authenticated caller for a request (token subject, email and roles).
///
/// Inserted by the auth middleware; present on every admin route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    email: String,
    roles: Vec<Role>,
}

impl PrincipalContext {
    pub fn new(user_id: UserId, email: impl Into<String>, roles: Vec<Role>) -> Self {
        Self { user_id, email: email.into(), roles }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn principal(&self) -> Principal {
        Principal::from_roles(self.user_id, self.roles.clone())
    }
}
