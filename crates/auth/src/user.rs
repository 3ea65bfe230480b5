//! Admin users: identity-service accounts paired with a local profile row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitrina_core::validate::{is_absolute_url, is_email};
use vitrina_core::{DomainError, DomainResult, UserId};

/// Local profile, one-to-one with an identity-service account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn initials(&self) -> String {
        initials(self.full_name.as_deref())
    }
}

/// A listed user: identity email joined with the profile, when one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserWithProfile {
    pub id: UserId,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub profile: Option<Profile>,
}

const FULL_NAME_TOO_SHORT: &str = "El nombre debe tener al menos 2 caracteres";
const FULL_NAME_TOO_LONG: &str = "El nombre no puede exceder 100 caracteres";

fn check_full_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    let len = name.chars().count();
    if len < 2 {
        return Err(DomainError::validation(FULL_NAME_TOO_SHORT));
    }
    if len > 100 {
        return Err(DomainError::validation(FULL_NAME_TOO_LONG));
    }
    Ok(name.to_string())
}

fn check_avatar(url: Option<&str>) -> DomainResult<Option<String>> {
    match url.map(str::trim) {
        None | Some("") => Ok(None),
        Some(url) if is_absolute_url(url) => Ok(Some(url.to_string())),
        Some(_) => Err(DomainError::validation("Debe ser una URL válida")),
    }
}

fn check_password(password: &str) -> DomainResult<()> {
    if password.is_empty() {
        return Err(DomainError::validation("La contraseña es requerida"));
    }
    if password.chars().count() < 8 {
        return Err(DomainError::validation("La contraseña debe tener al menos 8 caracteres"));
    }
    let lower = password.chars().any(|c| c.is_ascii_lowercase());
    let upper = password.chars().any(|c| c.is_ascii_uppercase());
    let digit = password.chars().any(|c| c.is_ascii_digit());
    if !(lower && upper && digit) {
        return Err(DomainError::validation(
            "La contraseña debe contener al menos una mayúscula, una minúscula y un número",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateUserInput {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Validated account request, ready for the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

impl CreateUserInput {
    /// Field order: email, password, confirmation, full name, avatar. The
    /// password match is checked last.
    pub fn validate(&self) -> DomainResult<NewUser> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(DomainError::validation("El email es requerido"));
        }
        if !is_email(email) {
            return Err(DomainError::validation("Email inválido"));
        }
        check_password(&self.password)?;
        if self.confirm_password.is_empty() {
            return Err(DomainError::validation("Debes confirmar la contraseña"));
        }
        if self.full_name.trim().is_empty() {
            return Err(DomainError::validation("El nombre completo es requerido"));
        }
        let full_name = check_full_name(&self.full_name)?;
        let avatar_url = check_avatar(self.avatar_url.as_deref())?;
        if self.password != self.confirm_password {
            return Err(DomainError::validation("Las contraseñas no coinciden"));
        }
        Ok(NewUser {
            email: email.to_string(),
            password: self.password.clone(),
            full_name,
            avatar_url,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateProfileInput {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Profile changes. `full_name: None` leaves the name as is; the avatar is
/// always overwritten, so `None` clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl UpdateProfileInput {
    pub fn validate(&self) -> DomainResult<ProfileUpdate> {
        let full_name = self.full_name.as_deref().map(check_full_name).transpose()?;
        let avatar_url = check_avatar(self.avatar_url.as_deref())?;
        Ok(ProfileUpdate { full_name, avatar_url })
    }
}

impl ProfileUpdate {
    pub fn apply(&self, profile: &mut Profile, now: DateTime<Utc>) {
        if let Some(name) = &self.full_name {
            profile.full_name = Some(name.clone());
        }
        profile.avatar_url = self.avatar_url.clone();
        profile.updated_at = Some(now);
    }
}

/// Avatar initials: first letters of the first two words, or the first two
/// letters of a single word. `"U"` when there is no name.
pub fn initials(full_name: Option<&str>) -> String {
    let words: Vec<&str> = full_name.unwrap_or("").split_whitespace().collect();
    let picked: String = match words.as_slice() {
        [] => return "U".to_string(),
        [word] => word.chars().take(2).collect(),
        [first, second, ..] => first.chars().take(1).chain(second.chars().take(1)).collect(),
    };
    picked.to_uppercase()
}
