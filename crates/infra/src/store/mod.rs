//! Catalog and profile persistence.
//!
//! Two implementations share the traits below: an in-memory store for tests
//! and local development, and a Postgres store for deployments.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use vitrina_auth::{Profile, ProfileUpdate};
use vitrina_catalog::{
    CategoryInput, FamilyInput, FeatureInput, NewProduct, NewVariant, OptionInput, Page,
    ProductFilter, SubcategoryInput,
};
use vitrina_catalog::{
    Category, Family, Feature, Product, ProductOption, Subcategory, Variant, VariantFeature,
};
use vitrina_core::{
    CategoryId, FamilyId, FeatureId, OptionId, ProductId, SubcategoryId, UserId, VariantId,
};

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;

/// Store-level failure. Callers log it and surface a generic message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("backend error in {operation}: {message}")]
    Backend { operation: &'static str, message: String },

    #[error("row not found in {0}")]
    NotFound(&'static str),

    #[error("failed to decode row in {operation}: {message}")]
    Decode { operation: &'static str, message: String },
}

impl StoreError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend { operation, message: message.into() }
    }

    pub fn decode(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Decode { operation, message: message.into() }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Row access for the catalog tables.
///
/// Every call is a single statement; there are no multi-statement
/// transactions. Updates and deletes return `None`/`false` when no row
/// matched.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    // families
    async fn list_families(&self) -> StoreResult<Vec<Family>>;
    async fn get_family(&self, id: FamilyId) -> StoreResult<Option<Family>>;
    async fn insert_family(&self, input: &FamilyInput) -> StoreResult<Family>;
    async fn update_family(&self, id: FamilyId, input: &FamilyInput) -> StoreResult<Option<Family>>;
    async fn delete_family(&self, id: FamilyId) -> StoreResult<bool>;
    async fn family_has_categories(&self, id: FamilyId) -> StoreResult<bool>;

    // categories
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn get_category(&self, id: CategoryId) -> StoreResult<Option<Category>>;
    async fn insert_category(&self, input: &CategoryInput) -> StoreResult<Category>;
    async fn update_category(&self, id: CategoryId, input: &CategoryInput) -> StoreResult<Option<Category>>;
    async fn delete_category(&self, id: CategoryId) -> StoreResult<bool>;
    async fn category_has_subcategories(&self, id: CategoryId) -> StoreResult<bool>;

    // subcategories
    async fn list_subcategories(&self) -> StoreResult<Vec<Subcategory>>;
    async fn get_subcategory(&self, id: SubcategoryId) -> StoreResult<Option<Subcategory>>;
    async fn insert_subcategory(&self, input: &SubcategoryInput) -> StoreResult<Subcategory>;
    async fn update_subcategory(
        &self,
        id: SubcategoryId,
        input: &SubcategoryInput,
    ) -> StoreResult<Option<Subcategory>>;
    async fn delete_subcategory(&self, id: SubcategoryId) -> StoreResult<bool>;
    async fn subcategory_has_products(&self, id: SubcategoryId) -> StoreResult<bool>;

    // options
    async fn list_options(&self) -> StoreResult<Vec<ProductOption>>;
    async fn get_option(&self, id: OptionId) -> StoreResult<Option<ProductOption>>;
    async fn insert_option(&self, input: &OptionInput) -> StoreResult<ProductOption>;
    async fn update_option(&self, id: OptionId, input: &OptionInput) -> StoreResult<Option<ProductOption>>;
    async fn delete_option(&self, id: OptionId) -> StoreResult<bool>;
    async fn option_has_features(&self, id: OptionId) -> StoreResult<bool>;
    /// Any product still links the option.
    async fn option_in_use(&self, id: OptionId) -> StoreResult<bool>;

    // features
    async fn list_features(&self) -> StoreResult<Vec<Feature>>;
    async fn get_feature(&self, id: FeatureId) -> StoreResult<Option<Feature>>;
    async fn insert_feature(&self, input: &FeatureInput) -> StoreResult<Feature>;
    async fn update_feature(&self, id: FeatureId, input: &FeatureInput) -> StoreResult<Option<Feature>>;
    async fn delete_feature(&self, id: FeatureId) -> StoreResult<bool>;
    async fn feature_in_use(&self, id: FeatureId) -> StoreResult<bool>;

    // products
    /// All products, ordered by name.
    async fn list_products(&self) -> StoreResult<Vec<Product>>;
    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>>;
    async fn insert_product(&self, product: &NewProduct) -> StoreResult<Product>;
    async fn delete_product(&self, id: ProductId) -> StoreResult<bool>;
    /// Products matching `filter` whose ancestor chain is complete, ordered
    /// by name, windowed by `page`.
    async fn query_products(&self, filter: &ProductFilter, page: Page) -> StoreResult<Vec<Product>>;
    async fn count_products(&self, filter: &ProductFilter) -> StoreResult<u64>;

    // option links
    async fn insert_option_link(&self, product_id: ProductId, option_id: OptionId) -> StoreResult<()>;
    async fn delete_option_link(&self, product_id: ProductId, option_id: OptionId) -> StoreResult<()>;
    async fn delete_option_links(&self, product_id: ProductId) -> StoreResult<()>;
    async fn list_option_links(&self, product_id: ProductId) -> StoreResult<Vec<OptionId>>;

    // variants
    async fn insert_variant(&self, variant: &NewVariant) -> StoreResult<Variant>;
    async fn delete_variant(&self, id: VariantId) -> StoreResult<()>;
    async fn delete_variants(&self, product_id: ProductId) -> StoreResult<()>;
    async fn list_variants(&self, product_ids: &[ProductId]) -> StoreResult<Vec<Variant>>;
    async fn list_all_variants(&self) -> StoreResult<Vec<Variant>>;

    // variant feature links
    async fn insert_variant_feature(&self, variant_id: VariantId, feature_id: FeatureId) -> StoreResult<()>;
    async fn delete_variant_feature(&self, variant_id: VariantId, feature_id: FeatureId) -> StoreResult<()>;
    async fn delete_variant_features(&self, variant_ids: &[VariantId]) -> StoreResult<()>;
    async fn list_variant_features(&self, variant_ids: &[VariantId]) -> StoreResult<Vec<VariantFeature>>;
}

/// Local profile rows, keyed by identity-service user id.
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Newest first.
    async fn list_profiles(&self) -> StoreResult<Vec<Profile>>;
    async fn get_profile(&self, id: UserId) -> StoreResult<Option<Profile>>;
    async fn upsert_profile(&self, profile: &Profile) -> StoreResult<Profile>;
    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Profile>>;
    async fn delete_profile(&self, id: UserId) -> StoreResult<bool>;
}

/// Shared handles as injected into services.
pub type SharedCatalogStore = Arc<dyn CatalogStore>;
pub type SharedProfileStore = Arc<dyn ProfileStore>;
