use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vitrina_core::UserId;

use crate::Role;

/// Session token payload issued at admin login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Identity service account id.
    pub sub: UserId,
    pub email: String,
    pub roles: Vec<Role>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl JwtClaims {
    pub fn new(sub: UserId, email: impl Into<String>, roles: Vec<Role>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub,
            email: email.into(),
            roles,
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    /// A session is live from `issued_at` (inclusive) to `expires_at` (exclusive).
    pub fn check_window(&self, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
        match () {
            _ if self.expires_at <= self.issued_at => Err(TokenValidationError::InvalidTimeWindow),
            _ if now < self.issued_at => Err(TokenValidationError::NotYetValid),
            _ if now >= self.expires_at => Err(TokenValidationError::Expired),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("session expired")]
    Expired,

    #[error("session issued in the future")]
    NotYetValid,

    #[error("session expires before it was issued")]
    InvalidTimeWindow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_window_bounds() {
        let now = Utc::now();
        let claims = JwtClaims::new(UserId::new(), "a@b.es", vec![Role::ADMIN], now, Duration::minutes(10));
        assert!(claims.check_window(now).is_ok());
        assert_eq!(claims.check_window(now + Duration::minutes(10)), Err(TokenValidationError::Expired));
        assert_eq!(claims.check_window(now - Duration::seconds(1)), Err(TokenValidationError::NotYetValid));

        let broken = JwtClaims { expires_at: now, ..claims };
        assert_eq!(broken.check_window(now), Err(TokenValidationError::InvalidTimeWindow));
    }
}
