//! Catalog and user actions.
//!
//! An action validates its input, issues a short sequence of store calls and
//! returns a tagged result. Store failures are logged here and replaced by a
//! generic localized message; callers never see backend details. Successful
//! mutations publish a revalidation notice for the affected admin view.

pub mod dashboard;
pub mod hierarchy;
pub mod options;
pub mod products;
pub mod storefront;
pub mod users;

use thiserror::Error;
use tracing::error;

use vitrina_catalog::DeleteBlocker;
use vitrina_core::DomainError;

use crate::revalidation::Revalidator;
use crate::store::{SharedCatalogStore, StoreError};

pub use users::UserActions;

/// Tagged action failure. Every variant carries a user-facing message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Blocked(DeleteBlocker),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidId(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Failed(String),
}

impl ActionError {
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<DomainError> for ActionError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::Conflict(msg) => ActionError::Validation(msg),
            DomainError::InvalidId(msg) => ActionError::InvalidId(msg),
            DomainError::NotFound(msg) => ActionError::NotFound(msg),
        }
    }
}

impl From<DeleteBlocker> for ActionError {
    fn from(blocker: DeleteBlocker) -> Self {
        ActionError::Blocked(blocker)
    }
}

pub type ActionResult<T> = Result<T, ActionError>;

/// Log a store failure and replace it with `message`.
pub(crate) fn failed(message: impl Into<String>) -> impl FnOnce(StoreError) -> ActionError {
    let message = message.into();
    move |err| {
        error!(error = %err, "{message}");
        ActionError::Failed(message)
    }
}

/// Catalog-side actions over one store.
#[derive(Clone)]
pub struct CatalogActions {
    store: SharedCatalogStore,
    revalidator: Revalidator,
}

impl CatalogActions {
    pub fn new(store: SharedCatalogStore, revalidator: Revalidator) -> Self {
        Self { store, revalidator }
    }

    pub fn revalidator(&self) -> &Revalidator {
        &self.revalidator
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use vitrina_catalog::{
        CategoryInput, FamilyInput, FeatureInput, OptionInput, SubcategoryInput,
    };
    use vitrina_core::{FeatureId, OptionId, SubcategoryId};

    use super::CatalogActions;
    use crate::revalidation::Revalidator;
    use crate::store::{CatalogStore, InMemoryCatalogStore};

    pub fn actions() -> (CatalogActions, Arc<InMemoryCatalogStore>) {
        let store = Arc::new(InMemoryCatalogStore::new());
        (CatalogActions::new(store.clone(), Revalidator::default()), store)
    }

    /// Family → category → subcategory; returns the subcategory id.
    pub async fn subcategory(store: &InMemoryCatalogStore, family: &str, category: &str, sub: &str) -> SubcategoryId {
        let f = store.insert_family(&FamilyInput { name: family.into() }).await.unwrap();
        let c = store
            .insert_category(&CategoryInput { name: category.into(), family_id: f.id })
            .await
            .unwrap();
        store
            .insert_subcategory(&SubcategoryInput { name: sub.into(), category_id: c.id })
            .await
            .unwrap()
            .id
    }

    /// An option with the given feature values.
    pub async fn option(store: &InMemoryCatalogStore, name: &str, values: &[&str]) -> (OptionId, Vec<FeatureId>) {
        let o = store.insert_option(&OptionInput { name: name.into() }).await.unwrap();
        let mut ids = Vec::new();
        for value in values {
            let f = store
                .insert_feature(&FeatureInput { value: (*value).into(), option_id: o.id })
                .await
                .unwrap();
            ids.push(f.id);
        }
        (o.id, ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_tags() {
        assert_eq!(
            ActionError::from(DomainError::validation("El nombre es requerido")),
            ActionError::Validation("El nombre es requerido".into())
        );
        assert_eq!(
            ActionError::from(DomainError::invalid_id("Slug de producto inválido")),
            ActionError::InvalidId("Slug de producto inválido".into())
        );
        assert_eq!(
            ActionError::from(DeleteBlocker::FamilyHasCategories).message(),
            "No se puede eliminar una familia con categorías"
        );
    }

    #[test]
    fn store_failures_become_generic_messages() {
        let err = failed("Error al crear la familia")(StoreError::backend("insert_family", "boom"));
        assert_eq!(err, ActionError::Failed("Error al crear la familia".into()));
    }
}
