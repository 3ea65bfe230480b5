//! `vitrina-core`: ids, domain errors and the traits shared by the catalog crates.
//!
//! No I/O lives here.

pub mod entity;
pub mod error;
pub mod id;
pub mod validate;
pub mod value_object;

pub use entity::{index_by_id, Entity};
pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, FamilyId, FeatureId, OptionId, ProductId, SubcategoryId, UserId, VariantId};
pub use value_object::ValueObject;
