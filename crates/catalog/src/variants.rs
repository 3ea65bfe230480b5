//! Variant generator and the editable variant set used while creating a
//! product.
//!
//! A combination holds one feature per selected option, in option order.

use serde::{Deserialize, Serialize};

use vitrina_core::{DomainError, DomainResult, FeatureId};

use crate::options::OptionWithFeatures;
use crate::validation::{check_price_cents, check_stock, VariantInput};

/// A variant not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantStub {
    pub feature_ids: Vec<FeatureId>,
    pub price: u64,
    pub stock: i64,
}

impl VariantStub {
    pub fn to_input(&self) -> VariantInput {
        VariantInput {
            feature_ids: self.feature_ids.clone(),
            price: Some(self.price as i64),
            stock: Some(self.stock),
        }
    }
}

/// Every combination of one feature per option, built by extending a single
/// empty combination option by option. No options means no combinations.
pub fn cartesian_product(options: &[OptionWithFeatures]) -> Vec<Vec<FeatureId>> {
    if options.is_empty() {
        return Vec::new();
    }
    let mut combinations: Vec<Vec<FeatureId>> = vec![Vec::new()];
    for option in options {
        let mut extended = Vec::with_capacity(combinations.len() * option.features.len());
        for combination in &combinations {
            for feature in &option.features {
                let mut next = combination.clone();
                next.push(feature.id);
                extended.push(next);
            }
        }
        combinations = extended;
    }
    combinations
}

/// One stub per combination at the base price with no stock.
pub fn generate_variants(options: &[OptionWithFeatures], base_price: u64) -> Vec<VariantStub> {
    cartesian_product(options)
        .into_iter()
        .map(|feature_ids| VariantStub { feature_ids, price: base_price, stock: 0 })
        .collect()
}

fn missing_variant(index: usize) -> DomainError {
    DomainError::not_found(format!("variante {index}"))
}

/// The working set of variants for a product being created.
#[derive(Debug, Clone)]
pub struct VariantPlanner {
    options: Vec<OptionWithFeatures>,
    base_price: u64,
    variants: Vec<VariantStub>,
}

impl VariantPlanner {
    pub fn new(options: Vec<OptionWithFeatures>, base_price: u64) -> Self {
        Self { options, base_price, variants: Vec::new() }
    }

    pub fn with_variants(mut self, variants: Vec<VariantStub>) -> Self {
        self.variants = variants;
        self
    }

    pub fn variants(&self) -> &[VariantStub] {
        &self.variants
    }

    pub fn into_variants(self) -> Vec<VariantStub> {
        self.variants
    }

    fn require_options(&self) -> DomainResult<()> {
        if self.options.is_empty() {
            return Err(DomainError::validation(
                "Debes seleccionar al menos una opción para crear variantes",
            ));
        }
        Ok(())
    }

    /// Fill the set with every combination. Only allowed while it is empty.
    pub fn generate_all(&mut self) -> DomainResult<usize> {
        self.require_options()?;
        if !self.variants.is_empty() {
            return Err(DomainError::conflict(
                "Ya existen variantes; elimínalas antes de generar todas las combinaciones",
            ));
        }
        self.variants = generate_variants(&self.options, self.base_price);
        Ok(self.variants.len())
    }

    /// Reorder `feature_ids` into option order, checking there is exactly one
    /// feature per option and nothing else.
    fn normalize(&self, feature_ids: &[FeatureId]) -> DomainResult<Vec<FeatureId>> {
        let mut ordered = Vec::with_capacity(self.options.len());
        for option in &self.options {
            let mut picked = feature_ids.iter().filter(|id| option.feature(**id).is_some());
            match (picked.next(), picked.next()) {
                (Some(id), None) => ordered.push(*id),
                _ => {
                    return Err(DomainError::validation(format!(
                        "Selecciona una característica para {}",
                        option.option.name
                    )));
                }
            }
        }
        if ordered.len() != feature_ids.len() {
            return Err(DomainError::validation(
                "La variante contiene características que no pertenecen a las opciones seleccionadas",
            ));
        }
        Ok(ordered)
    }

    /// Add one hand-picked combination. `price: None` uses the base price.
    pub fn add_manual(&mut self, feature_ids: &[FeatureId], price: Option<u64>, stock: i64) -> DomainResult<()> {
        self.require_options()?;
        let feature_ids = self.normalize(feature_ids)?;
        let price = price.map(check_price_cents).transpose()?.unwrap_or(self.base_price);
        let stock = check_stock(stock)?;
        if self.variants.iter().any(|v| v.feature_ids == feature_ids) {
            return Err(DomainError::conflict("Ya existe una variante con esa combinación"));
        }
        self.variants.push(VariantStub {
            feature_ids,
            price,
            stock,
        });
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> DomainResult<VariantStub> {
        if index >= self.variants.len() {
            return Err(missing_variant(index));
        }
        Ok(self.variants.remove(index))
    }

    fn variant_mut(&mut self, index: usize) -> DomainResult<&mut VariantStub> {
        self.variants.get_mut(index).ok_or_else(|| missing_variant(index))
    }

    pub fn set_price(&mut self, index: usize, price: u64) -> DomainResult<()> {
        let price = check_price_cents(price)?;
        self.variant_mut(index)?.price = price;
        Ok(())
    }

    pub fn set_stock(&mut self, index: usize, stock: i64) -> DomainResult<()> {
        let stock = check_stock(stock)?;
        self.variant_mut(index)?.stock = stock;
        Ok(())
    }

    pub fn to_inputs(&self) -> Vec<VariantInput> {
        self.variants.iter().map(VariantStub::to_input).collect()
    }
}
