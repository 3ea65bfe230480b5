use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitrina_core::UserId;

// -------------------------
// Request DTOs
// -------------------------

/// Body of every rename: families, categories, subcategories and options.
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct FeatureValueRequest {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopProductsQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user_id: UserId,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct CreatedUser {
    pub user_id: UserId,
}

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub user_id: UserId,
    pub email: String,
    pub roles: Vec<String>,
}
