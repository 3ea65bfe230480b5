//! Identity service seam: accounts and password sign-in live outside the
//! catalog database. Profiles are stored locally, keyed by the account id.

pub mod http;
pub mod in_memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vitrina_auth::NewUser;
use vitrina_core::UserId;

pub use http::HttpIdentityAdmin;
pub use in_memory::InMemoryIdentityAdmin;

/// Account as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("email already registered")]
    AlreadyRegistered,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account not found")]
    NotFound,

    #[error("identity service error: {0}")]
    Backend(String),
}

pub type IdentityResult<T> = Result<T, IdentityError>;

#[async_trait::async_trait]
pub trait IdentityAdmin: Send + Sync {
    async fn list_users(&self) -> IdentityResult<Vec<IdentityUser>>;

    /// Create a confirmed account.
    async fn create_user(&self, user: &NewUser) -> IdentityResult<IdentityUser>;

    async fn delete_user(&self, id: UserId) -> IdentityResult<()>;

    /// Password sign-in.
    async fn sign_in(&self, email: &str, password: &str) -> IdentityResult<IdentityUser>;
}

pub type SharedIdentityAdmin = Arc<dyn IdentityAdmin>;
