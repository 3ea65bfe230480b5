//! Identity admin over a GoTrue-compatible HTTP API.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use vitrina_auth::NewUser;
use vitrina_core::UserId;

use super::{IdentityAdmin, IdentityError, IdentityResult, IdentityUser};

/// Largest page the admin listing asks for.
const LIST_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone)]
pub struct HttpIdentityAdmin {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

#[derive(Debug, Deserialize)]
struct UserList {
    users: Vec<IdentityUser>,
}

#[derive(Debug, Deserialize)]
struct TokenGrant {
    user: IdentityUser,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default, alias = "message", alias = "error_description")]
    msg: Option<String>,
}

impl ErrorBody {
    fn is_duplicate_email(&self) -> bool {
        self.error_code.as_deref() == Some("email_exists")
            || self.msg.as_deref().is_some_and(|m| m.contains("already been registered") || m.contains("already registered"))
    }
}

impl HttpIdentityAdmin {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.service_key).bearer_auth(&self.service_key)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> IdentityResult<reqwest::Response> {
        self.authorized(req)
            .send()
            .await
            .map_err(|e| IdentityError::Backend(e.to_string()))
    }

    async fn error_body(resp: reqwest::Response) -> (StatusCode, ErrorBody) {
        let status = resp.status();
        let body = resp.json::<ErrorBody>().await.unwrap_or_default();
        (status, body)
    }

    fn unexpected(status: StatusCode, body: &ErrorBody) -> IdentityError {
        IdentityError::Backend(format!(
            "status {}: {}",
            status.as_u16(),
            body.msg.as_deref().unwrap_or("no message")
        ))
    }
}

#[async_trait::async_trait]
impl IdentityAdmin for HttpIdentityAdmin {
    #[instrument(skip(self), err)]
    async fn list_users(&self) -> IdentityResult<Vec<IdentityUser>> {
        let req = self
            .client
            .get(self.url("/auth/v1/admin/users"))
            .query(&[("page", 1), ("per_page", LIST_PAGE_SIZE)]);
        let resp = self.send(req).await?;
        if !resp.status().is_success() {
            let (status, body) = Self::error_body(resp).await;
            return Err(Self::unexpected(status, &body));
        }
        let list: UserList = resp.json().await.map_err(|e| IdentityError::Backend(e.to_string()))?;
        debug!(count = list.users.len(), "listed identity accounts");
        Ok(list.users)
    }

    #[instrument(skip(self, user), fields(email = %user.email), err)]
    async fn create_user(&self, user: &NewUser) -> IdentityResult<IdentityUser> {
        let req = self.client.post(self.url("/auth/v1/admin/users")).json(&json!({
            "email": user.email,
            "password": user.password,
            "email_confirm": true,
            "user_metadata": { "full_name": user.full_name },
        }));
        let resp = self.send(req).await?;
        if !resp.status().is_success() {
            let (status, body) = Self::error_body(resp).await;
            if body.is_duplicate_email() {
                return Err(IdentityError::AlreadyRegistered);
            }
            return Err(Self::unexpected(status, &body));
        }
        resp.json().await.map_err(|e| IdentityError::Backend(e.to_string()))
    }

    #[instrument(skip(self), err)]
    async fn delete_user(&self, id: UserId) -> IdentityResult<()> {
        let req = self.client.delete(self.url(&format!("/auth/v1/admin/users/{id}")));
        let resp = self.send(req).await?;
        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(IdentityError::NotFound),
            _ => {
                let (status, body) = Self::error_body(resp).await;
                Err(Self::unexpected(status, &body))
            }
        }
    }

    #[instrument(skip(self, password), err)]
    async fn sign_in(&self, email: &str, password: &str) -> IdentityResult<IdentityUser> {
        let req = self
            .client
            .post(self.url("/auth/v1/token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let resp = self.send(req).await?;
        match resp.status() {
            s if s.is_success() => {
                let grant: TokenGrant =
                    resp.json().await.map_err(|e| IdentityError::Backend(e.to_string()))?;
                Ok(grant.user)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Err(IdentityError::InvalidCredentials),
            _ => {
                let (status, body) = Self::error_body(resp).await;
                Err(Self::unexpected(status, &body))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let admin = HttpIdentityAdmin::new("https://id.example.test/", "key");
        assert_eq!(admin.url("/auth/v1/admin/users"), "https://id.example.test/auth/v1/admin/users");
    }

    #[test]
    fn duplicate_email_detection() {
        let by_code: ErrorBody = serde_json::from_str(r#"{"error_code":"email_exists"}"#).unwrap();
        assert!(by_code.is_duplicate_email());
        let by_msg: ErrorBody =
            serde_json::from_str(r#"{"msg":"A user with this email address has already been registered"}"#).unwrap();
        assert!(by_msg.is_duplicate_email());
        let other: ErrorBody = serde_json::from_str(r#"{"msg":"weak password"}"#).unwrap();
        assert!(!other.is_duplicate_email());
    }

    #[test]
    fn account_payload_decodes_without_email() {
        let user: IdentityUser = serde_json::from_str(
            r#"{"id":"0190f1a2-0000-7000-8000-000000000001","created_at":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(user.email, None);
    }
}
