//! Catalog domain module.
//!
//! This crate contains the business rules for the product catalog: the
//! three-level taxonomy, global options and their features, the product
//! aggregate with its variants, input validation, the variant generator and the
//! storefront projections. Everything here is deterministic domain logic (no IO,
//! no HTTP, no storage).

pub mod filter;
pub mod integrity;
pub mod listing;
pub mod options;
pub mod product;
pub mod seo;
pub mod slug;
pub mod stats;
pub mod taxonomy;
pub mod validation;
pub mod variants;

pub use filter::{FilterParams, Page, ProductFilter, TaxonomyScope};
pub use integrity::{DeleteBlocker, EntityKind};
pub use listing::{ListedProduct, PriceRange};
pub use options::{Feature, OptionWithFeatures, ProductOption};
pub use product::{
    FeatureWithOption, NewProduct, NewVariant, OptionProduct, Product, ProductDetail,
    ProductWithSubcategory, Variant, VariantFeature, VariantWithFeatures,
};
pub use taxonomy::{Category, CategoryNode, Family, FamilyNode, Subcategory, TaxonomyChain, TaxonomyPath};
pub use validation::{
    CategoryInput, FamilyInput, FeatureInput, OptionInput, ProductBasicInfo, ProductCreation,
    SubcategoryInput, ValidatedProduct, VariantInput, VariantSpec,
};
pub use seo::{Breadcrumb, PageMeta, ProductJsonLd, SitemapEntry};
pub use stats::{CatalogSnapshot, CategoryStats, DashboardStats, FamilyStats, TopProduct};
pub use variants::{VariantPlanner, VariantStub};
