//! `vitrina-infra`: storage, identity service and the actions built on them.
//!
//! - `store`: `CatalogStore` / `ProfileStore` with in-memory and Postgres backends
//! - `identity`: account admin and password sign-in (in-memory or HTTP)
//! - `actions`: validated catalog and user operations returning tagged results
//! - `revalidation`: broadcast of admin views that changed

pub mod actions;
pub mod identity;
pub mod revalidation;
pub mod store;

pub use actions::{ActionError, ActionResult, CatalogActions, UserActions};
pub use identity::{HttpIdentityAdmin, IdentityAdmin, IdentityError, InMemoryIdentityAdmin, SharedIdentityAdmin};
pub use revalidation::{RevalidationNotice, Revalidator};
pub use store::{
    CatalogStore, InMemoryCatalogStore, PostgresCatalogStore, ProfileStore, SharedCatalogStore,
    SharedProfileStore, StoreError, StoreResult,
};
