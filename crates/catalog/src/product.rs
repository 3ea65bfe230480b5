use serde::{Deserialize, Serialize};

use vitrina_core::{Entity, FeatureId, OptionId, ProductId, SubcategoryId, VariantId};

use crate::options::{Feature, OptionWithFeatures, ProductOption};
use crate::taxonomy::{Subcategory, TaxonomyChain};

/// Product row.
///
/// `price` is the base price in the smallest currency unit (cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub price: u64,
    pub detail: Option<String>,
    pub image_path: Option<String>,
    pub subcategory_id: SubcategoryId,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Variant row. A missing price means "same as the product".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub price: Option<u64>,
    pub stock: i64,
}

impl Variant {
    pub fn effective_price(&self, base_price: u64) -> u64 {
        self.price.unwrap_or(base_price)
    }
}

impl Entity for Variant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Link row: an option selected for a product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionProduct {
    pub product_id: ProductId,
    pub option_id: OptionId,
}

/// Link row: one feature of a variant's combination.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantFeature {
    pub variant_id: VariantId,
    pub feature_id: FeatureId,
}

/// Insert payload for a product row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub price: u64,
    pub detail: Option<String>,
    pub image_path: Option<String>,
    pub subcategory_id: SubcategoryId,
}

impl NewProduct {
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            sku: self.sku,
            price: self.price,
            detail: self.detail,
            image_path: self.image_path,
            subcategory_id: self.subcategory_id,
        }
    }
}

/// Insert payload for a variant row. The price is already resolved against
/// the product's base price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVariant {
    pub product_id: ProductId,
    pub price: u64,
    pub stock: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductWithSubcategory {
    #[serde(flatten)]
    pub product: Product,
    pub subcategory: Option<Subcategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureWithOption {
    #[serde(flatten)]
    pub feature: Feature,
    pub option: ProductOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantWithFeatures {
    #[serde(flatten)]
    pub variant: Variant,
    pub features: Vec<FeatureWithOption>,
}

impl VariantWithFeatures {
    pub fn feature_ids(&self) -> Vec<FeatureId> {
        self.features.iter().map(|f| f.feature.id).collect()
    }
}

/// Fully loaded product: ancestors, selected options and variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub taxonomy: Option<TaxonomyChain>,
    pub options: Vec<OptionWithFeatures>,
    pub variants: Vec<VariantWithFeatures>,
}

impl ProductDetail {
    pub fn total_stock(&self) -> i64 {
        self.variants.iter().map(|v| v.variant.stock.max(0)).sum()
    }

    /// Products without variants are always sold as available.
    pub fn has_stock(&self) -> bool {
        self.variants.is_empty() || self.total_stock() > 0
    }

    /// Find the variant whose combination is exactly `feature_ids`
    /// (order-insensitive).
    pub fn variant_for(&self, feature_ids: &[FeatureId]) -> Option<&VariantWithFeatures> {
        let mut wanted = feature_ids.to_vec();
        wanted.sort();
        self.variants.iter().find(|v| {
            let mut ids = v.feature_ids();
            ids.sort();
            ids == wanted
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(stocks: &[i64]) -> ProductDetail {
        let product = Product {
            id: ProductId::new(1),
            name: "Camiseta".into(),
            sku: "CAM-1".into(),
            price: 1000,
            detail: None,
            image_path: None,
            subcategory_id: SubcategoryId::new(1),
        };
        let variants = stocks
            .iter()
            .enumerate()
            .map(|(i, stock)| VariantWithFeatures {
                variant: Variant {
                    id: VariantId::new(i as i64 + 1),
                    product_id: product.id,
                    price: None,
                    stock: *stock,
                },
                features: vec![FeatureWithOption {
                    feature: Feature {
                        id: FeatureId::new(i as i64 + 10),
                        value: format!("v{i}"),
                        option_id: OptionId::new(1),
                    },
                    option: ProductOption { id: OptionId::new(1), name: "Color".into() },
                }],
            })
            .collect();
        ProductDetail { product, taxonomy: None, options: vec![], variants }
    }

    #[test]
    fn product_without_variants_is_available() {
        assert!(detail(&[]).has_stock());
    }

    #[test]
    fn product_with_variants_needs_positive_stock() {
        assert!(!detail(&[0, 0]).has_stock());
        assert!(detail(&[0, 3]).has_stock());
        assert_eq!(detail(&[2, 3]).total_stock(), 5);
    }

    #[test]
    fn variant_lookup_by_combination() {
        let d = detail(&[1, 2]);
        let found = d.variant_for(&[FeatureId::new(11)]).unwrap();
        assert_eq!(found.variant.id, VariantId::new(2));
        assert!(d.variant_for(&[FeatureId::new(99)]).is_none());
    }

    #[test]
    fn effective_price_falls_back_to_base() {
        let v = Variant { id: VariantId::new(1), product_id: ProductId::new(1), price: None, stock: 0 };
        assert_eq!(v.effective_price(1250), 1250);
        let v = Variant { price: Some(900), ..v };
        assert_eq!(v.effective_price(1250), 900);
    }
}
