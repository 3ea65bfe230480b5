//! Admin dashboard figures, computed over a snapshot of catalog rows.

use std::collections::HashMap;

use serde::Serialize;

use vitrina_core::{CategoryId, ProductId, SubcategoryId};

use crate::product::{Product, Variant};
use crate::taxonomy::{Category, Family, Subcategory};

/// Variants with fewer units than this (but some) count as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 10;
pub const DEFAULT_TOP_PRODUCTS: usize = 5;

/// Borrowed view of every catalog row the dashboard needs.
#[derive(Debug, Clone, Copy)]
pub struct CatalogSnapshot<'a> {
    pub families: &'a [Family],
    pub categories: &'a [Category],
    pub subcategories: &'a [Subcategory],
    pub products: &'a [Product],
    pub variants: &'a [Variant],
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_products: usize,
    pub total_variants: usize,
    pub total_stock: i64,
    /// Cents.
    pub total_inventory_value: u64,
    pub total_families: usize,
    pub total_categories: usize,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopProduct {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub price: u64,
    pub total_stock: i64,
    pub variant_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub category_name: String,
    pub product_count: usize,
    pub total_stock: i64,
    /// Mean base price in cents, rounded down.
    pub average_price: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyStats {
    pub family_name: String,
    pub category_count: usize,
    pub product_count: usize,
    pub total_value: u64,
}

fn units(stock: i64) -> u64 {
    stock.max(0) as u64
}

impl<'a> CatalogSnapshot<'a> {
    fn variants_by_product(&self) -> HashMap<ProductId, Vec<&'a Variant>> {
        let mut map: HashMap<ProductId, Vec<&'a Variant>> = HashMap::new();
        for v in self.variants {
            map.entry(v.product_id).or_default().push(v);
        }
        map
    }

    fn base_prices(&self) -> HashMap<ProductId, u64> {
        self.products.iter().map(|p| (p.id, p.price)).collect()
    }

    fn products_in(&self, subcategories: &[SubcategoryId]) -> impl Iterator<Item = &'a Product> + '_ {
        let subs = subcategories.to_vec();
        self.products.iter().filter(move |p| subs.contains(&p.subcategory_id))
    }

    fn subcategories_of(&self, category: CategoryId) -> Vec<SubcategoryId> {
        self.subcategories
            .iter()
            .filter(|s| s.category_id == category)
            .map(|s| s.id)
            .collect()
    }

    pub fn dashboard_stats(&self) -> DashboardStats {
        let base = self.base_prices();
        let inventory_value = self
            .variants
            .iter()
            .map(|v| {
                let price = v.effective_price(base.get(&v.product_id).copied().unwrap_or(0));
                price * units(v.stock)
            })
            .sum();

        DashboardStats {
            total_products: self.products.len(),
            total_variants: self.variants.len(),
            total_stock: self.variants.iter().map(|v| v.stock.max(0)).sum(),
            total_inventory_value: inventory_value,
            total_families: self.families.len(),
            total_categories: self.categories.len(),
            low_stock_count: self
                .variants
                .iter()
                .filter(|v| v.stock > 0 && v.stock < LOW_STOCK_THRESHOLD)
                .count(),
            out_of_stock_count: self.variants.iter().filter(|v| v.stock == 0).count(),
        }
    }

    /// Products with the most units across their variants. Ties keep
    /// catalog order.
    pub fn top_products_by_stock(&self, limit: usize) -> Vec<TopProduct> {
        let by_product = self.variants_by_product();
        let mut rows: Vec<TopProduct> = self
            .products
            .iter()
            .map(|p| {
                let variants = by_product.get(&p.id).map(Vec::as_slice).unwrap_or(&[]);
                TopProduct {
                    id: p.id,
                    name: p.name.clone(),
                    sku: p.sku.clone(),
                    price: p.price,
                    total_stock: variants.iter().map(|v| v.stock.max(0)).sum(),
                    variant_count: variants.len(),
                }
            })
            .collect();
        rows.sort_by(|a, b| b.total_stock.cmp(&a.total_stock));
        rows.truncate(limit);
        rows
    }

    /// Sorted by product count, largest first.
    pub fn category_stats(&self) -> Vec<CategoryStats> {
        let by_product = self.variants_by_product();
        let mut rows: Vec<CategoryStats> = self
            .categories
            .iter()
            .map(|category| {
                let subs = self.subcategories_of(category.id);
                let products: Vec<&Product> = self.products_in(&subs).collect();
                let total_stock = products
                    .iter()
                    .flat_map(|p| by_product.get(&p.id).into_iter().flatten())
                    .map(|v| v.stock.max(0))
                    .sum();
                let average_price = match products.len() {
                    0 => 0,
                    n => products.iter().map(|p| p.price).sum::<u64>() / n as u64,
                };
                CategoryStats {
                    category_name: category.name.clone(),
                    product_count: products.len(),
                    total_stock,
                    average_price,
                }
            })
            .collect();
        rows.sort_by(|a, b| b.product_count.cmp(&a.product_count));
        rows
    }

    /// Sorted by stock value, largest first. A variant without its own price
    /// is valued at the product's base price.
    pub fn family_stats(&self) -> Vec<FamilyStats> {
        let by_product = self.variants_by_product();
        let mut rows: Vec<FamilyStats> = self
            .families
            .iter()
            .map(|family| {
                let categories: Vec<&Category> =
                    self.categories.iter().filter(|c| c.family_id == family.id).collect();
                let subs: Vec<SubcategoryId> = categories
                    .iter()
                    .flat_map(|c| self.subcategories_of(c.id))
                    .collect();
                let products: Vec<&Product> = self.products_in(&subs).collect();
                let total_value = products
                    .iter()
                    .flat_map(|p| {
                        by_product
                            .get(&p.id)
                            .into_iter()
                            .flatten()
                            .map(move |v| v.effective_price(p.price) * units(v.stock))
                    })
                    .sum();
                FamilyStats {
                    family_name: family.name.clone(),
                    category_count: categories.len(),
                    product_count: products.len(),
                    total_value,
                }
            })
            .collect();
        rows.sort_by(|a, b| b.total_value.cmp(&a.total_value));
        rows
    }
}
