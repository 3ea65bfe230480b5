//! Local account table for development and tests.
//!
//! Passwords are compared in plain text; this backend never leaves a test
//! or a developer machine.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use vitrina_auth::NewUser;
use vitrina_core::UserId;

use super::{IdentityAdmin, IdentityError, IdentityResult, IdentityUser};

#[derive(Debug, Clone)]
struct Account {
    user: IdentityUser,
    password: String,
}

#[derive(Debug, Default)]
pub struct InMemoryIdentityAdmin {
    accounts: RwLock<HashMap<UserId, Account>>,
}

impl InMemoryIdentityAdmin {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> IdentityError {
        IdentityError::Backend("account table lock poisoned".into())
    }

    fn insert(&self, email: &str, password: &str) -> IdentityResult<IdentityUser> {
        let mut accounts = self.accounts.write().map_err(|_| Self::poisoned())?;
        let taken = accounts
            .values()
            .any(|a| a.user.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(email)));
        if taken {
            return Err(IdentityError::AlreadyRegistered);
        }
        let user = IdentityUser { id: UserId::new(), email: Some(email.to_string()), created_at: Utc::now() };
        accounts.insert(user.id, Account { user: user.clone(), password: password.to_string() });
        Ok(user)
    }

    /// Register an account outside the admin flow (bootstrap admin, tests).
    pub fn seed(&self, email: &str, password: &str) -> IdentityResult<IdentityUser> {
        self.insert(email, password)
    }
}

#[async_trait::async_trait]
impl IdentityAdmin for InMemoryIdentityAdmin {
    async fn list_users(&self) -> IdentityResult<Vec<IdentityUser>> {
        let accounts = self.accounts.read().map_err(|_| Self::poisoned())?;
        let mut users: Vec<IdentityUser> = accounts.values().map(|a| a.user.clone()).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn create_user(&self, user: &NewUser) -> IdentityResult<IdentityUser> {
        self.insert(&user.email, &user.password)
    }

    async fn delete_user(&self, id: UserId) -> IdentityResult<()> {
        let mut accounts = self.accounts.write().map_err(|_| Self::poisoned())?;
        accounts.remove(&id).map(drop).ok_or(IdentityError::NotFound)
    }

    async fn sign_in(&self, email: &str, password: &str) -> IdentityResult<IdentityUser> {
        let accounts = self.accounts.read().map_err(|_| Self::poisoned())?;
        accounts
            .values()
            .find(|a| {
                a.user.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(email))
                    && a.password == password
            })
            .map(|a| a.user.clone())
            .ok_or(IdentityError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password: "Secreta123".into(),
            full_name: "Ana García".into(),
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let admin = InMemoryIdentityAdmin::new();
        admin.create_user(&new_user("ana@tienda.es")).await.unwrap();
        let err = admin.create_user(&new_user("ANA@tienda.es")).await.unwrap_err();
        assert_eq!(err, IdentityError::AlreadyRegistered);
    }

    #[tokio::test]
    async fn sign_in_checks_password() {
        let admin = InMemoryIdentityAdmin::new();
        let created = admin.create_user(&new_user("ana@tienda.es")).await.unwrap();
        let signed = admin.sign_in("ana@tienda.es", "Secreta123").await.unwrap();
        assert_eq!(signed.id, created.id);
        assert_eq!(
            admin.sign_in("ana@tienda.es", "otra").await.unwrap_err(),
            IdentityError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn delete_unknown_account_is_not_found() {
        let admin = InMemoryIdentityAdmin::new();
        assert_eq!(admin.delete_user(UserId::new()).await.unwrap_err(), IdentityError::NotFound);
    }
}
