//! Catalog rule failures.
//!
//! Every variant carries the message shown to the admin, already in the
//! storefront's language. Store and transport failures live in `vitrina-infra`.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// First failing field of a form.
    #[error("{0}")]
    Validation(String),

    /// Id text (path segment, slug suffix) that does not parse.
    #[error("{0}")]
    InvalidId(String),

    /// Row referenced from a form or a variant plan is absent.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate feature combination, or a second row with a unique key.
    #[error("{0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m) | Self::InvalidId(m) | Self::NotFound(m) | Self::Conflict(m) => m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_bare_message() {
        let err = DomainError::conflict("Ya existe una variante con esa combinación");
        assert_eq!(err.to_string(), "Ya existe una variante con esa combinación");
        assert_eq!(err.message(), err.to_string());
    }
}
