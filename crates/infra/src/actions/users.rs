//! Admin users: identity-service accounts plus local profiles.
//!
//! The identity service is the source of truth for accounts. The profile row
//! is written after the account and a profile failure never undoes it.

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use vitrina_auth::{CreateUserInput, Profile, UpdateProfileInput, UserWithProfile};
use vitrina_core::UserId;

use super::{failed, ActionError, ActionResult};
use crate::identity::{IdentityError, IdentityUser, SharedIdentityAdmin};
use crate::revalidation::Revalidator;
use crate::store::SharedProfileStore;

const USERS_PATH: &str = "/admin/dashboard/users";

const PROFILE_NOT_FOUND: &str = "Perfil no encontrado";
const USER_NOT_FOUND: &str = "Usuario no encontrado";

#[derive(Clone)]
pub struct UserActions {
    identity: SharedIdentityAdmin,
    profiles: SharedProfileStore,
    revalidator: Revalidator,
}

impl UserActions {
    pub fn new(identity: SharedIdentityAdmin, profiles: SharedProfileStore, revalidator: Revalidator) -> Self {
        Self { identity, profiles, revalidator }
    }

    /// Profiles newest first, each with its account email. When the account
    /// list cannot be read the emails are left blank.
    pub async fn list_users(&self) -> ActionResult<Vec<UserWithProfile>> {
        let (profiles, accounts) = tokio::join!(self.profiles.list_profiles(), self.identity.list_users());
        let profiles = profiles.map_err(failed("Error al cargar los usuarios"))?;
        let accounts = accounts.unwrap_or_else(|err| {
            warn!(error = %err, "account list unavailable");
            Vec::new()
        });

        Ok(profiles
            .into_iter()
            .map(|profile| {
                let account = accounts.iter().find(|a| a.id == profile.id);
                UserWithProfile {
                    id: profile.id,
                    email: account.and_then(|a| a.email.clone()).unwrap_or_default(),
                    created_at: account.map_or(profile.created_at, |a| a.created_at),
                    profile: Some(profile),
                }
            })
            .collect())
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_user(&self, input: &CreateUserInput) -> ActionResult<UserId> {
        let user = input.validate()?;
        let account = self.identity.create_user(&user).await.map_err(|err| match err {
            IdentityError::AlreadyRegistered => ActionError::Validation("Este email ya está registrado".into()),
            other => {
                error!(error = %other, "identity account creation failed");
                ActionError::Failed("Error al crear el usuario".into())
            }
        })?;

        let profile = Profile {
            id: account.id,
            full_name: Some(user.full_name.clone()),
            avatar_url: user.avatar_url.clone(),
            created_at: account.created_at,
            updated_at: None,
        };
        if let Err(err) = self.profiles.upsert_profile(&profile).await {
            warn!(error = %err, user_id = %account.id, "profile not written; account kept");
        }

        info!(user_id = %account.id, "user created");
        self.revalidator.notify(USERS_PATH);
        Ok(account.id)
    }

    #[instrument(skip(self, input))]
    pub async fn update_profile(&self, id: UserId, input: &UpdateProfileInput) -> ActionResult<Profile> {
        let update = input.validate()?;
        let profile = self
            .profiles
            .update_profile(id, &update, Utc::now())
            .await
            .map_err(failed("Error al actualizar el perfil"))?
            .ok_or_else(|| ActionError::NotFound(PROFILE_NOT_FOUND.into()))?;
        info!(user_id = %id, "profile updated");
        self.revalidator.notify(USERS_PATH);
        Ok(profile)
    }

    /// Account first, then the profile. A leftover profile is logged only.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: UserId) -> ActionResult<()> {
        self.identity.delete_user(id).await.map_err(|err| match err {
            IdentityError::NotFound => ActionError::NotFound(USER_NOT_FOUND.into()),
            other => {
                error!(error = %other, "identity account deletion failed");
                ActionError::Failed("Error al eliminar el usuario".into())
            }
        })?;
        if let Err(err) = self.profiles.delete_profile(id).await {
            warn!(error = %err, user_id = %id, "profile not deleted");
        }
        info!(user_id = %id, "user deleted");
        self.revalidator.notify(USERS_PATH);
        Ok(())
    }

    pub async fn current_profile(&self, id: UserId) -> ActionResult<Profile> {
        self.profiles
            .get_profile(id)
            .await
            .map_err(failed("Error al cargar el perfil"))?
            .ok_or_else(|| ActionError::NotFound(PROFILE_NOT_FOUND.into()))
    }

    /// Password sign-in against the identity service.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> ActionResult<IdentityUser> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ActionError::Validation("Email y contraseña son requeridos".into()));
        }
        let account = self.identity.sign_in(email, password).await.map_err(|err| match err {
            IdentityError::InvalidCredentials => {
                ActionError::Unauthenticated("Email o contraseña incorrectos".into())
            }
            other => {
                error!(error = %other, "sign-in failed");
                ActionError::Failed("Error inesperado al iniciar sesión".into())
            }
        })?;
        info!(user_id = %account.id, "signed in");
        Ok(account)
    }
}
