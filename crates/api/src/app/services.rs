//! Backend wiring: picks Postgres or in-memory storage and the HTTP or
//! in-memory identity service from the configuration.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use tracing::{info, warn};

use vitrina_auth::{Hs256Jwt, Profile};
use vitrina_infra::{
    CatalogActions, HttpIdentityAdmin, InMemoryCatalogStore, InMemoryIdentityAdmin, PostgresCatalogStore,
    ProfileStore, Revalidator, SharedCatalogStore, SharedIdentityAdmin, SharedProfileStore, UserActions,
};

use crate::config::{AppConfig, SeedAdmin};

/// Shared handles injected into every handler.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogActions,
    pub users: UserActions,
    pub revalidator: Revalidator,
    pub tokens: Arc<Hs256Jwt>,
    pub token_ttl: Duration,
    pub public_base_url: String,
}

pub async fn build_services(config: &AppConfig, tokens: Arc<Hs256Jwt>) -> anyhow::Result<AppServices> {
    let (catalog_store, profile_store): (SharedCatalogStore, SharedProfileStore) = match &config.database_url {
        Some(url) => {
            let store = PostgresCatalogStore::connect(url).await.context("connecting to Postgres")?;
            store.migrate().await.context("applying catalog schema")?;
            info!("using Postgres catalog store");
            let store = Arc::new(store);
            (store.clone() as SharedCatalogStore, store as SharedProfileStore)
        }
        None => {
            info!("using in-memory catalog store");
            let store = Arc::new(InMemoryCatalogStore::new());
            (store.clone() as SharedCatalogStore, store as SharedProfileStore)
        }
    };

    let identity: SharedIdentityAdmin = match &config.identity {
        Some(identity) => {
            info!(url = %identity.url, "using HTTP identity service");
            if config.seed_admin.is_some() {
                warn!("SEED_ADMIN_* ignored with an external identity service");
            }
            Arc::new(HttpIdentityAdmin::new(&identity.url, &identity.service_key))
        }
        None => {
            info!("using in-memory identity service");
            let identity = Arc::new(InMemoryIdentityAdmin::new());
            if let Some(seed) = &config.seed_admin {
                seed_admin(&identity, profile_store.as_ref(), seed).await?;
            }
            identity
        }
    };

    let revalidator = Revalidator::default();
    Ok(AppServices {
        catalog: CatalogActions::new(catalog_store, revalidator.clone()),
        users: UserActions::new(identity, profile_store, revalidator.clone()),
        revalidator,
        tokens,
        token_ttl: config.jwt_ttl,
        public_base_url: config.public_base_url.clone(),
    })
}

async fn seed_admin(
    identity: &InMemoryIdentityAdmin,
    profiles: &dyn ProfileStore,
    seed: &SeedAdmin,
) -> anyhow::Result<()> {
    let account = identity
        .seed(&seed.email, &seed.password)
        .with_context(|| format!("seeding admin account {}", seed.email))?;
    let profile = Profile {
        id: account.id,
        full_name: Some("Administrador".to_string()),
        avatar_url: None,
        created_at: Utc::now(),
        updated_at: None,
    };
    profiles.upsert_profile(&profile).await.context("seeding admin profile")?;
    info!(email = %seed.email, "seeded admin account");
    Ok(())
}
