//! Storefront listing projection.

use serde::Serialize;

use vitrina_core::ValueObject;

use crate::product::{Product, Variant};
use crate::slug::generate_product_slug;
use crate::taxonomy::TaxonomyChain;

/// Cheapest and most expensive price a product is offered at, in cents.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub min: u64,
    pub max: u64,
}

impl ValueObject for PriceRange {}

impl PriceRange {
    pub fn single(price: u64) -> Self {
        Self { min: price, max: price }
    }

    fn include(self, price: u64) -> Self {
        Self { min: self.min.min(price), max: self.max.max(price) }
    }
}

/// Range over the base price and every explicit variant price. Variants
/// without a price do not widen the range.
pub fn price_range(base_price: u64, variants: &[Variant]) -> PriceRange {
    variants
        .iter()
        .filter_map(|v| v.price)
        .fold(PriceRange::single(base_price), PriceRange::include)
}

/// A product with no variants is sold as available.
pub fn has_stock(variants: &[Variant]) -> bool {
    variants.is_empty() || variants.iter().any(|v| v.stock > 0)
}

/// One row of the public product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub taxonomy: Option<TaxonomyChain>,
    pub slug: String,
    pub variant_count: usize,
    pub min_price: u64,
    pub max_price: u64,
    pub has_stock: bool,
}

impl ListedProduct {
    pub fn project(product: Product, taxonomy: Option<TaxonomyChain>, variants: &[Variant]) -> Self {
        let range = price_range(product.price, variants);
        Self {
            slug: generate_product_slug(&product.name, product.id),
            taxonomy,
            variant_count: variants.len(),
            min_price: range.min,
            max_price: range.max,
            has_stock: has_stock(variants),
            product,
        }
    }

    pub fn price_range(&self) -> PriceRange {
        PriceRange { min: self.min_price, max: self.max_price }
    }
}

/// Bounds of the base prices in the catalog, for the storefront price slider.
pub fn catalog_price_bounds(base_prices: impl IntoIterator<Item = u64>) -> Option<PriceRange> {
    let mut prices = base_prices.into_iter();
    let first = prices.next()?;
    Some(prices.fold(PriceRange::single(first), PriceRange::include))
}
