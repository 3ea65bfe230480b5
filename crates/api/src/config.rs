//! Process configuration read from the environment.
//!
//! `main` loads `.env` with `dotenvy` before calling [`AppConfig::from_env`].
//! Optional backends fall back to in-memory implementations when unset.

use chrono::Duration;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_JWT_TTL_MINUTES: i64 = 60;
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{present} is set but {missing} is not")]
    Incomplete { present: &'static str, missing: &'static str },
}

/// Identity service admin endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    pub url: String,
    pub service_key: String,
}

/// Account created at startup so a fresh in-memory deployment can log in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub database_url: Option<String>,
    pub identity: Option<IdentityConfig>,
    pub public_base_url: String,
    pub seed_admin: Option<SeedAdmin>,
}

impl AppConfig {
    /// In-memory everything, signing with `jwt_secret`.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            jwt_secret: jwt_secret.into(),
            jwt_ttl: Duration::minutes(DEFAULT_JWT_TTL_MINUTES),
            database_url: None,
            identity: None,
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            seed_admin: None,
        }
    }

    pub fn with_seed_admin(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.seed_admin = Some(SeedAdmin { email: email.into(), password: password.into() });
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });
        let mut config = Self::new(jwt_secret);

        if let Some(addr) = get("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(raw) = get("JWT_TTL_MINUTES") {
            let minutes = raw
                .parse::<i64>()
                .ok()
                .filter(|m| *m > 0)
                .ok_or(ConfigError::InvalidNumber { key: "JWT_TTL_MINUTES", value: raw })?;
            config.jwt_ttl = Duration::minutes(minutes);
        }
        if let Some(url) = get("PUBLIC_BASE_URL") {
            config.public_base_url = url;
        }
        config.database_url = get("DATABASE_URL");

        config.identity = match (get("IDENTITY_URL"), get("IDENTITY_SERVICE_KEY")) {
            (Some(url), Some(service_key)) => Some(IdentityConfig { url, service_key }),
            (Some(_), None) => {
                return Err(ConfigError::Incomplete { present: "IDENTITY_URL", missing: "IDENTITY_SERVICE_KEY" });
            }
            (None, Some(_)) => {
                return Err(ConfigError::Incomplete { present: "IDENTITY_SERVICE_KEY", missing: "IDENTITY_URL" });
            }
            (None, None) => None,
        };

        config.seed_admin = match (get("SEED_ADMIN_EMAIL"), get("SEED_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(SeedAdmin { email, password }),
            (Some(_), None) => {
                return Err(ConfigError::Incomplete { present: "SEED_ADMIN_EMAIL", missing: "SEED_ADMIN_PASSWORD" });
            }
            _ => None,
        };

        Ok(config)
    }
}
