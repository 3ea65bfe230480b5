//! Referential-integrity rules and the user-facing messages tied to them.
//!
//! Taxonomy, option and feature rows are never cascaded: a delete is refused
//! while dependents exist, and the caller gets a typed reason.

use serde::Serialize;
use thiserror::Error;

/// Why a delete was refused.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteBlocker {
    #[error("No se puede eliminar una familia con categorías")]
    FamilyHasCategories,

    #[error("No se puede eliminar una categoría con subcategorías")]
    CategoryHasSubcategories,

    #[error("No se puede eliminar una subcategoría con productos")]
    SubcategoryHasProducts,

    #[error("No se puede eliminar una opción con características")]
    OptionHasFeatures,

    #[error("No se puede eliminar una opción asignada a productos")]
    OptionInUse,

    #[error("No se puede eliminar una característica que está en uso")]
    FeatureInUse,
}

impl DeleteBlocker {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            DeleteBlocker::FamilyHasCategories => "family_has_categories",
            DeleteBlocker::CategoryHasSubcategories => "category_has_subcategories",
            DeleteBlocker::SubcategoryHasProducts => "subcategory_has_products",
            DeleteBlocker::OptionHasFeatures => "option_has_features",
            DeleteBlocker::OptionInUse => "option_in_use",
            DeleteBlocker::FeatureInUse => "feature_in_use",
        }
    }
}

/// Catalog entity kinds, used to phrase generic failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Family,
    Category,
    Subcategory,
    Option,
    Feature,
    Product,
}

impl EntityKind {
    /// Noun with its definite article ("la familia", "el producto").
    fn with_article(self) -> &'static str {
        match self {
            EntityKind::Family => "la familia",
            EntityKind::Category => "la categoría",
            EntityKind::Subcategory => "la subcategoría",
            EntityKind::Option => "la opción",
            EntityKind::Feature => "la característica",
            EntityKind::Product => "el producto",
        }
    }

    fn plural_with_article(self) -> &'static str {
        match self {
            EntityKind::Family => "las familias",
            EntityKind::Category => "las categorías",
            EntityKind::Subcategory => "las subcategorías",
            EntityKind::Option => "las opciones",
            EntityKind::Feature => "las características",
            EntityKind::Product => "los productos",
        }
    }

    pub fn create_failed(self) -> String {
        format!("Error al crear {}", self.with_article())
    }

    pub fn update_failed(self) -> String {
        format!("Error al actualizar {}", self.with_article())
    }

    pub fn delete_failed(self) -> String {
        format!("Error al eliminar {}", self.with_article())
    }

    pub fn load_failed(self) -> String {
        format!("Error al cargar {}", self.with_article())
    }

    pub fn list_failed(self) -> String {
        format!("Error al cargar {}", self.plural_with_article())
    }

    pub fn not_found(self) -> String {
        match self {
            EntityKind::Family => "Familia no encontrada",
            EntityKind::Category => "Categoría no encontrada",
            EntityKind::Subcategory => "Subcategoría no encontrada",
            EntityKind::Option => "Opción no encontrada",
            EntityKind::Feature => "Característica no encontrada",
            EntityKind::Product => "Producto no encontrado",
        }
        .to_string()
    }

    /// Admin view refreshed after a successful mutation of this kind.
    pub fn admin_path(self) -> &'static str {
        match self {
            EntityKind::Family | EntityKind::Category | EntityKind::Subcategory => "/admin/dashboard/families",
            EntityKind::Option | EntityKind::Feature | EntityKind::Product => "/admin/dashboard/products",
        }
    }
}
