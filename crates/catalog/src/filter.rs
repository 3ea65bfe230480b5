//! Storefront filter and paging value objects.
//!
//! Query parameters arrive as loose strings; they are parsed once into a
//! [`ProductFilter`] and a [`Page`] and never mutated afterwards.

use serde::{Deserialize, Serialize};

use vitrina_core::{CategoryId, FamilyId, SubcategoryId, ValueObject};

use crate::product::Product;
use crate::taxonomy::TaxonomyChain;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// The single taxonomy node a listing is narrowed to.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "level", content = "id", rename_all = "snake_case")]
pub enum TaxonomyScope {
    #[default]
    All,
    Family(FamilyId),
    Category(CategoryId),
    Subcategory(SubcategoryId),
}

impl TaxonomyScope {
    /// The most specific of the supplied ids wins.
    pub fn from_ids(
        family: Option<FamilyId>,
        category: Option<CategoryId>,
        subcategory: Option<SubcategoryId>,
    ) -> Self {
        match (subcategory, category, family) {
            (Some(id), _, _) => TaxonomyScope::Subcategory(id),
            (None, Some(id), _) => TaxonomyScope::Category(id),
            (None, None, Some(id)) => TaxonomyScope::Family(id),
            (None, None, None) => TaxonomyScope::All,
        }
    }

    /// Whether a product whose subcategory resolves to `chain` is in scope.
    ///
    /// Products with an incomplete ancestor chain only match `All`.
    pub fn contains(&self, subcategory_id: SubcategoryId, chain: Option<&TaxonomyChain>) -> bool {
        match self {
            TaxonomyScope::All => true,
            TaxonomyScope::Subcategory(id) => subcategory_id == *id,
            TaxonomyScope::Category(id) => chain.is_some_and(|c| c.category_id() == *id),
            TaxonomyScope::Family(id) => chain.and_then(TaxonomyChain::family_id) == Some(*id),
        }
    }
}

/// Immutable public-listing filter. Price bounds are inclusive, in cents,
/// and apply to the base price only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductFilter {
    pub scope: TaxonomyScope,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
}

impl ValueObject for ProductFilter {}

impl ProductFilter {
    pub fn new(scope: TaxonomyScope, min_price: Option<u64>, max_price: Option<u64>) -> Self {
        Self { scope, min_price, max_price }
    }

    pub fn price_matches(&self, price: u64) -> bool {
        self.min_price.is_none_or(|min| price >= min) && self.max_price.is_none_or(|max| price <= max)
    }

    pub fn matches(&self, product: &Product, chain: Option<&TaxonomyChain>) -> bool {
        self.scope.contains(product.subcategory_id, chain) && self.price_matches(product.price)
    }
}

/// Offset paging window.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub offset: u32,
    pub limit: u32,
}

impl ValueObject for Page {}

impl Default for Page {
    fn default() -> Self {
        Self { offset: 0, limit: DEFAULT_PAGE_SIZE }
    }
}

impl Page {
    /// A zero limit falls back to the default page size; larger limits are
    /// capped.
    pub fn new(offset: u32, limit: u32) -> Self {
        let limit = match limit {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        };
        Self { offset, limit }
    }

    /// A full page means there may be more rows after it.
    pub fn has_more(&self, returned: usize) -> bool {
        returned == self.limit as usize
    }

    pub fn next(&self) -> Self {
        Self { offset: self.offset.saturating_add(self.limit), limit: self.limit }
    }

    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

/// Raw storefront query string (`?familia=&categoria=&subcategoria=&precioMin=&precioMax=`).
///
/// Prices are given in currency units (`12.5` is 12,50 €).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilterParams {
    #[serde(default, rename = "familia")]
    pub family: Option<String>,
    #[serde(default, rename = "categoria")]
    pub category: Option<String>,
    #[serde(default, rename = "subcategoria")]
    pub subcategory: Option<String>,
    #[serde(default, rename = "precioMin")]
    pub min_price: Option<String>,
    #[serde(default, rename = "precioMax")]
    pub max_price: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

fn positive_id<T: From<i64>>(raw: Option<&str>) -> Option<T> {
    raw?.trim().parse::<i64>().ok().filter(|id| *id > 0).map(T::from)
}

fn price_in_cents(raw: Option<&str>) -> Option<u64> {
    let units = raw?.trim().parse::<f64>().ok()?;
    if !units.is_finite() || units < 0.0 {
        return None;
    }
    Some((units * 100.0).round() as u64)
}

fn count(raw: Option<&str>) -> Option<u32> {
    raw?.trim().parse::<u32>().ok()
}

impl FilterParams {
    /// Unparseable or non-positive values are ignored rather than rejected.
    pub fn filter(&self) -> ProductFilter {
        let scope = TaxonomyScope::from_ids(
            positive_id(self.family.as_deref()),
            positive_id(self.category.as_deref()),
            positive_id(self.subcategory.as_deref()),
        );
        ProductFilter::new(
            scope,
            price_in_cents(self.min_price.as_deref()),
            price_in_cents(self.max_price.as_deref()),
        )
    }

    pub fn page(&self) -> Page {
        Page::new(
            count(self.offset.as_deref()).unwrap_or(0),
            count(self.limit.as_deref()).unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    pub fn scope(&self) -> TaxonomyScope {
        self.filter().scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{Category, Family, Subcategory};

    fn params(pairs: &[(&str, &str)]) -> FilterParams {
        let mut p = FilterParams::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "familia" => p.family = v,
                "categoria" => p.category = v,
                "subcategoria" => p.subcategory = v,
                "precioMin" => p.min_price = v,
                "precioMax" => p.max_price = v,
                "offset" => p.offset = v,
                "limit" => p.limit = v,
                _ => unreachable!(),
            }
        }
        p
    }

    fn chain() -> TaxonomyChain {
        TaxonomyChain {
            subcategory: Subcategory { id: SubcategoryId::new(5), name: "Manga corta".into(), category_id: CategoryId::new(3) },
            category: Some(Category { id: CategoryId::new(3), name: "Camisetas".into(), family_id: FamilyId::new(1) }),
            family: Some(Family { id: FamilyId::new(1), name: "Ropa".into() }),
        }
    }

    #[test]
    fn most_specific_id_takes_precedence() {
        let f = params(&[("familia", "1"), ("categoria", "3"), ("subcategoria", "5")]).filter();
        assert_eq!(f.scope, TaxonomyScope::Subcategory(SubcategoryId::new(5)));
        let f = params(&[("familia", "1"), ("categoria", "3")]).filter();
        assert_eq!(f.scope, TaxonomyScope::Category(CategoryId::new(3)));
        let f = params(&[("familia", "1"), ("subcategoria", "abc")]).filter();
        assert_eq!(f.scope, TaxonomyScope::Family(FamilyId::new(1)));
        let f = params(&[("familia", "0")]).filter();
        assert_eq!(f.scope, TaxonomyScope::All);
    }

    #[test]
    fn prices_are_parsed_as_currency_units() {
        let f = params(&[("precioMin", "10"), ("precioMax", "19.99")]).filter();
        assert_eq!(f.min_price, Some(1000));
        assert_eq!(f.max_price, Some(1999));
        let f = params(&[("precioMin", "-4"), ("precioMax", "nope")]).filter();
        assert_eq!(f.min_price, None);
        assert_eq!(f.max_price, None);
    }

    #[test]
    fn scope_checks_the_parent_chain() {
        let chain = chain();
        let sub = SubcategoryId::new(5);
        assert!(TaxonomyScope::Category(CategoryId::new(3)).contains(sub, Some(&chain)));
        assert!(TaxonomyScope::Family(FamilyId::new(1)).contains(sub, Some(&chain)));
        assert!(!TaxonomyScope::Family(FamilyId::new(2)).contains(sub, Some(&chain)));
        assert!(!TaxonomyScope::Category(CategoryId::new(3)).contains(sub, None));
        assert!(TaxonomyScope::All.contains(sub, None));
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let f = ProductFilter::new(TaxonomyScope::All, Some(1000), Some(2000));
        assert!(f.price_matches(1000));
        assert!(f.price_matches(2000));
        assert!(!f.price_matches(999));
        assert!(!f.price_matches(2001));
    }

    #[test]
    fn paging_defaults_and_caps() {
        assert_eq!(params(&[]).page(), Page { offset: 0, limit: DEFAULT_PAGE_SIZE });
        assert_eq!(params(&[("offset", "40"), ("limit", "500")]).page(), Page { offset: 40, limit: MAX_PAGE_SIZE });
        let page = Page::new(2, 2);
        assert_eq!(page.apply(0..10), vec![2, 3]);
        assert!(page.has_more(2));
        assert!(!page.has_more(1));
        assert_eq!(page.next().offset, 4);
    }
}
