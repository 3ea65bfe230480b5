//! Input validation for catalog mutations.
//!
//! Every rule reports a user-facing message, and validation stops at the first
//! failing field so callers can surface exactly one message. Inputs are
//! trimmed before their length is checked.

use std::collections::HashSet;
use std::hash::Hash;

use serde::Deserialize;

use vitrina_core::{
    CategoryId, DomainError, DomainResult, FamilyId, FeatureId, OptionId, ProductId, SubcategoryId,
};

use vitrina_core::validate::is_absolute_url;

use crate::product::{NewProduct, NewVariant};

/// Upper bound for any price, in cents (999 999.99).
pub const MAX_PRICE_CENTS: u64 = 99_999_999;

struct TextRule {
    required: &'static str,
    min: Option<(usize, &'static str)>,
    max: (usize, &'static str),
}

const TAXONOMY_NAME: TextRule = TextRule {
    required: "El nombre es requerido",
    min: Some((2, "El nombre debe tener al menos 2 caracteres")),
    max: (100, "El nombre no puede exceder 100 caracteres"),
};

const OPTION_NAME: TextRule = TextRule {
    required: "El nombre es requerido",
    min: Some((2, "El nombre debe tener al menos 2 caracteres")),
    max: (50, "El nombre no puede exceder 50 caracteres"),
};

const FEATURE_VALUE: TextRule = TextRule {
    required: "El valor es requerido",
    min: None,
    max: (50, "El valor no puede exceder 50 caracteres"),
};

const PRODUCT_NAME: TextRule = TextRule {
    required: "El nombre es requerido",
    min: Some((2, "El nombre debe tener al menos 2 caracteres")),
    max: (200, "El nombre no puede exceder 200 caracteres"),
};

const SKU: TextRule = TextRule {
    required: "El SKU es requerido",
    min: None,
    max: (50, "El SKU no puede exceder 50 caracteres"),
};

fn check_text(value: &str, rule: &TextRule) -> DomainResult<String> {
    let value = value.trim();
    let len = value.chars().count();
    if len == 0 {
        return Err(DomainError::validation(rule.required));
    }
    if let Some((min, msg)) = rule.min {
        if len < min {
            return Err(DomainError::validation(msg));
        }
    }
    if len > rule.max.0 {
        return Err(DomainError::validation(rule.max.1));
    }
    Ok(value.to_string())
}

fn check_parent(positive: bool, msg: &'static str) -> DomainResult<()> {
    if positive { Ok(()) } else { Err(DomainError::validation(msg)) }
}

fn check_price(raw: i64) -> DomainResult<u64> {
    let cents = u64::try_from(raw).unwrap_or(0);
    check_price_cents(cents)
}

pub(crate) fn check_price_cents(cents: u64) -> DomainResult<u64> {
    if cents == 0 {
        return Err(DomainError::validation("El precio debe ser mayor a 0"));
    }
    if cents > MAX_PRICE_CENTS {
        return Err(DomainError::validation("El precio no puede exceder 999,999.99"));
    }
    Ok(cents)
}

pub(crate) fn check_stock(stock: i64) -> DomainResult<i64> {
    if stock < 0 {
        return Err(DomainError::validation("El stock no puede ser negativo"));
    }
    Ok(stock)
}

fn has_duplicates<T: Eq + Hash>(items: impl IntoIterator<Item = T>) -> bool {
    let mut seen = HashSet::new();
    items.into_iter().any(|item| !seen.insert(item))
}

/// Empty string and absent are the same thing for optional URLs.
pub fn check_optional_url(value: Option<&str>) -> DomainResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(url) if is_absolute_url(url) => Ok(Some(url.to_string())),
        Some(_) => Err(DomainError::validation("Debe ser una URL válida")),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FamilyInput {
    pub name: String,
}

impl FamilyInput {
    pub fn validate(&self) -> DomainResult<Self> {
        Ok(Self { name: check_text(&self.name, &TAXONOMY_NAME)? })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub family_id: FamilyId,
}

impl CategoryInput {
    pub fn validate(&self) -> DomainResult<Self> {
        let name = check_text(&self.name, &TAXONOMY_NAME)?;
        check_parent(self.family_id.is_positive(), "Debe seleccionar una familia")?;
        Ok(Self { name, family_id: self.family_id })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubcategoryInput {
    pub name: String,
    pub category_id: CategoryId,
}

impl SubcategoryInput {
    pub fn validate(&self) -> DomainResult<Self> {
        let name = check_text(&self.name, &TAXONOMY_NAME)?;
        check_parent(self.category_id.is_positive(), "Debe seleccionar una categoría")?;
        Ok(Self { name, category_id: self.category_id })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OptionInput {
    pub name: String,
}

impl OptionInput {
    pub fn validate(&self) -> DomainResult<Self> {
        Ok(Self { name: check_text(&self.name, &OPTION_NAME)? })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeatureInput {
    pub value: String,
    pub option_id: OptionId,
}

impl FeatureInput {
    pub fn validate(&self) -> DomainResult<Self> {
        let value = check_text(&self.value, &FEATURE_VALUE)?;
        check_parent(self.option_id.is_positive(), "Debe seleccionar una opción")?;
        Ok(Self { value, option_id: self.option_id })
    }
}

/// First step of product creation. Prices are in cents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductBasicInfo {
    pub name: String,
    pub sku: String,
    pub price: i64,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    pub subcategory_id: SubcategoryId,
}

impl ProductBasicInfo {
    pub fn validate(&self) -> DomainResult<NewProduct> {
        let name = check_text(&self.name, &PRODUCT_NAME)?;
        let sku = check_text(&self.sku, &SKU)?;
        if !sku
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(DomainError::validation(
                "El SKU solo puede contener letras mayúsculas, números, guiones y guiones bajos",
            ));
        }
        let price = check_price(self.price)?;
        let detail = match self.detail.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(d) if d.chars().count() > 1000 => {
                return Err(DomainError::validation("Los detalles no pueden exceder 1000 caracteres"));
            }
            Some(d) => Some(d.to_string()),
        };
        let image_path = check_optional_url(self.image_path.as_deref())?;
        check_parent(self.subcategory_id.is_positive(), "Debe seleccionar una subcategoría")?;

        Ok(NewProduct {
            name,
            sku,
            price,
            detail,
            image_path,
            subcategory_id: self.subcategory_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VariantInput {
    pub feature_ids: Vec<FeatureId>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub stock: Option<i64>,
}

/// A validated variant request. `price: None` means "use the base price".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSpec {
    pub feature_ids: Vec<FeatureId>,
    pub price: Option<u64>,
    pub stock: i64,
}

impl VariantInput {
    pub fn validate(&self) -> DomainResult<VariantSpec> {
        if self.feature_ids.is_empty() {
            return Err(DomainError::validation("Debe seleccionar al menos una característica"));
        }
        if self.feature_ids.iter().any(|id| !id.is_positive()) {
            return Err(DomainError::validation("Característica inválida"));
        }
        if has_duplicates(&self.feature_ids) {
            return Err(DomainError::validation("Una variante no puede repetir una característica"));
        }
        let price = self.price.map(check_price).transpose()?;
        let stock = check_stock(self.stock.unwrap_or(0))?;
        Ok(VariantSpec { feature_ids: self.feature_ids.clone(), price, stock })
    }
}

/// Complete product creation request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductCreation {
    pub basic_info: ProductBasicInfo,
    #[serde(default)]
    pub selected_options: Vec<OptionId>,
    #[serde(default)]
    pub variants: Vec<VariantInput>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProduct {
    pub product: NewProduct,
    pub option_ids: Vec<OptionId>,
    pub variants: Vec<VariantSpec>,
}

impl ProductCreation {
    pub fn validate(&self) -> DomainResult<ValidatedProduct> {
        let product = self.basic_info.validate()?;
        if self.selected_options.iter().any(|id| !id.is_positive()) {
            return Err(DomainError::validation("Opción inválida"));
        }
        if has_duplicates(&self.selected_options) {
            return Err(DomainError::validation("No se puede seleccionar la misma opción dos veces"));
        }
        if self.variants.is_empty() {
            return Err(DomainError::validation("Debe crear al menos una variante"));
        }
        let variants = self
            .variants
            .iter()
            .map(VariantInput::validate)
            .collect::<DomainResult<Vec<_>>>()?;
        let combinations = variants.iter().map(|v| {
            let mut ids = v.feature_ids.clone();
            ids.sort_unstable();
            ids
        });
        if has_duplicates(combinations) {
            return Err(DomainError::conflict("Ya existe una variante con esa combinación"));
        }
        Ok(ValidatedProduct {
            product,
            option_ids: self.selected_options.clone(),
            variants,
        })
    }
}

impl ValidatedProduct {
    /// Row payload for one variant, with the base price filled in.
    pub fn new_variant(&self, spec: &VariantSpec, product_id: ProductId) -> NewVariant {
        NewVariant {
            product_id,
            price: spec.price.unwrap_or(self.product.price),
            stock: spec.stock,
        }
    }
}
