//! HS256 token signing and verification.
//!
//! Time-window checks use the RFC 3339 `issued_at` / `expires_at` claims via
//! [`JwtClaims::check_window`], so the registered numeric `exp` claim is not required.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{JwtClaims, TokenValidationError};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("malformed token: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verifies bearer tokens.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// Shared-secret HS256 signer/validator.
#[derive(Clone)]
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256Jwt {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue(&self, claims: &JwtClaims) -> Result<String, JwtError> {
        Ok(jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &self.validation)?;
        data.claims.check_window(now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use chrono::Duration;
    use vitrina_core::UserId;

    #[test]
    fn issued_tokens_validate_with_same_secret() {
        let jwt = Hs256Jwt::new("s3cret");
        let now = Utc::now();
        let claims = JwtClaims::new(UserId::new(), "admin@tienda.es", vec![Role::ADMIN], now, Duration::minutes(5));
        let token = jwt.issue(&claims).unwrap();

        assert_eq!(jwt.validate(&token, now).unwrap(), claims);
        assert!(matches!(Hs256Jwt::new("other").validate(&token, now), Err(JwtError::Malformed(_))));
        assert!(matches!(
            jwt.validate(&token, now + Duration::minutes(6)),
            Err(JwtError::Claims(TokenValidationError::Expired))
        ));
        assert!(jwt.validate("not.a.token", now).is_err());
    }
}
