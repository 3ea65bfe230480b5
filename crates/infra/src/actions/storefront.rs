//! Public read path: filtered listing, filters panel, product page, SEO.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use vitrina_catalog::seo::{self, PageMeta, SitemapEntry};
use vitrina_catalog::slug::extract_id_from_slug;
use vitrina_catalog::taxonomy::{build_tree, resolve_path};
use vitrina_catalog::{
    listing, Category, Family, FamilyNode, ListedProduct, Page, PriceRange, ProductDetail, ProductFilter,
    Subcategory, TaxonomyChain,
};
use vitrina_core::{index_by_id, CategoryId, FamilyId, ProductId, SubcategoryId};

use super::{failed, ActionError, ActionResult, CatalogActions};
use crate::store::StoreResult;

/// Price slider bounds when the catalog is empty: 0 to 1000 €.
pub const DEFAULT_PRICE_RANGE: PriceRange = PriceRange { min: 0, max: 100_000 };

const PRODUCTS_LOAD_FAILED: &str = "Error al cargar los productos";
const FILTERS_LOAD_FAILED: &str = "Error al cargar los filtros";

/// One page of the public listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingPage {
    pub products: Vec<ListedProduct>,
    pub offset: u32,
    pub limit: u32,
    pub has_more: bool,
    /// Offset of the following page when `has_more`.
    pub next_offset: Option<u32>,
}

/// Everything the storefront filters panel needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiltersData {
    pub families: Vec<FamilyNode>,
    pub price_range: PriceRange,
}

/// Id-indexed taxonomy rows for resolving many chains at once.
struct ChainIndex {
    families: HashMap<FamilyId, Family>,
    categories: HashMap<CategoryId, Category>,
    subcategories: HashMap<SubcategoryId, Subcategory>,
}

impl ChainIndex {
    fn new(families: Vec<Family>, categories: Vec<Category>, subcategories: Vec<Subcategory>) -> Self {
        Self {
            families: index_by_id(families),
            categories: index_by_id(categories),
            subcategories: index_by_id(subcategories),
        }
    }

    fn chain(&self, subcategory_id: SubcategoryId) -> Option<TaxonomyChain> {
        let subcategory = self.subcategories.get(&subcategory_id)?.clone();
        let category = self.categories.get(&subcategory.category_id).cloned();
        let family = category.as_ref().and_then(|c| self.families.get(&c.family_id)).cloned();
        Some(TaxonomyChain { subcategory, category, family })
    }
}

impl CatalogActions {
    async fn chain_index(&self) -> StoreResult<ChainIndex> {
        let (families, categories, subcategories) = tokio::join!(
            self.store.list_families(),
            self.store.list_categories(),
            self.store.list_subcategories(),
        );
        Ok(ChainIndex::new(families?, categories?, subcategories?))
    }

    /// Products matching `filter`, by name, with price range and stock flag.
    pub async fn public_products(&self, filter: &ProductFilter, page: Page) -> ActionResult<ListingPage> {
        let products = self
            .store
            .query_products(filter, page)
            .await
            .map_err(failed(PRODUCTS_LOAD_FAILED))?;
        let ids: Vec<ProductId> = products.iter().map(|p| p.id).collect();
        let (variants, index) = tokio::join!(self.store.list_variants(&ids), self.chain_index());
        let variants = variants.map_err(failed(PRODUCTS_LOAD_FAILED))?;
        let index = index.map_err(failed(PRODUCTS_LOAD_FAILED))?;

        let mut by_product: HashMap<ProductId, Vec<_>> = HashMap::new();
        for variant in variants {
            by_product.entry(variant.product_id).or_default().push(variant);
        }

        let has_more = page.has_more(products.len());
        let products = products
            .into_iter()
            .map(|product| {
                let variants = by_product.remove(&product.id).unwrap_or_default();
                let chain = index.chain(product.subcategory_id);
                ListedProduct::project(product, chain, &variants)
            })
            .collect();

        Ok(ListingPage {
            products,
            offset: page.offset,
            limit: page.limit,
            has_more,
            next_offset: has_more.then(|| page.next().offset),
        })
    }

    pub async fn product_count(&self, filter: &ProductFilter) -> ActionResult<u64> {
        self.store
            .count_products(filter)
            .await
            .map_err(failed(PRODUCTS_LOAD_FAILED))
    }

    pub async fn filters_data(&self) -> ActionResult<FiltersData> {
        let (families, categories, subcategories, products) = tokio::join!(
            self.store.list_families(),
            self.store.list_categories(),
            self.store.list_subcategories(),
            self.store.list_products(),
        );
        let families = families.map_err(failed(FILTERS_LOAD_FAILED))?;
        let categories = categories.map_err(failed(FILTERS_LOAD_FAILED))?;
        let subcategories = subcategories.map_err(failed(FILTERS_LOAD_FAILED))?;
        let products = products.map_err(failed(FILTERS_LOAD_FAILED))?;

        let price_range =
            listing::catalog_price_bounds(products.iter().map(|p| p.price)).unwrap_or(DEFAULT_PRICE_RANGE);
        Ok(FiltersData { families: build_tree(families, categories, subcategories), price_range })
    }

    /// Product page lookup by `<name>-<id>` slug. Only the trailing id is
    /// significant.
    pub async fn product_by_slug(&self, slug: &str) -> ActionResult<ProductDetail> {
        let id = extract_id_from_slug(slug)?;
        self.product_detail(id).await
    }

    /// Home page plus every product page, in id order. A store failure
    /// degrades to the home page alone.
    pub async fn sitemap(&self, base_url: &str, now: DateTime<Utc>) -> Vec<SitemapEntry> {
        match self.store.list_products().await {
            Ok(mut products) => {
                products.sort_by_key(|p| p.id);
                seo::sitemap(base_url, products.iter().map(|p| (p.name.as_str(), p.id)), now)
            }
            Err(err) => {
                warn!(error = %err, "sitemap degraded to home page");
                seo::sitemap(base_url, std::iter::empty(), now)
            }
        }
    }

    /// Listing metadata for the most specific selected taxonomy node.
    pub async fn listing_meta(&self, base_url: &str, filter: &ProductFilter) -> PageMeta {
        let path = match self.families_with_relations().await {
            Ok(tree) => resolve_path(&tree, filter.scope),
            Err(_) => Default::default(),
        };
        let count = match self.store.count_products(filter).await {
            Ok(count) => Some(count as usize),
            Err(err) => {
                warn!(error = %err, "listing meta without product count");
                None
            }
        };
        seo::listing_meta(base_url, &path, count)
    }

    /// Product page metadata; unknown or malformed slugs get the not-found
    /// page.
    pub async fn product_meta(&self, base_url: &str, slug: &str) -> PageMeta {
        match self.product_by_slug(slug).await {
            Ok(detail) => seo::product_meta(base_url, &detail),
            Err(ActionError::Failed(message)) => {
                warn!(slug, reason = %message, "product meta degraded to not found");
                seo::product_not_found_meta(base_url)
            }
            Err(_) => seo::product_not_found_meta(base_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use vitrina_catalog::{NewProduct, NewVariant, TaxonomyScope};

    use super::*;
    use crate::actions::test_support::{actions, subcategory};
    use crate::store::{CatalogStore, InMemoryCatalogStore};

    async fn product(store: &InMemoryCatalogStore, name: &str, price: u64, sub: SubcategoryId) -> ProductId {
        store
            .insert_product(&NewProduct {
                name: name.into(),
                sku: name.to_uppercase().replace(' ', "-"),
                price,
                detail: None,
                image_path: None,
                subcategory_id: sub,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn subcategory_listing_is_ordered_and_paged() {
        let (actions, store) = actions();
        let sub = subcategory(&store, "Ropa", "Camisetas", "Manga corta").await;
        let other = subcategory(&store, "Hogar", "Cocina", "Tazas").await;
        for name in ["Delta", "Alfa", "Charlie", "Bravo"] {
            product(&store, name, 1000, sub).await;
        }
        product(&store, "Aaa taza", 500, other).await;

        let filter = ProductFilter::new(TaxonomyScope::Subcategory(sub), None, None);
        let page = actions.public_products(&filter, Page::new(1, 2)).await.unwrap();
        let names: Vec<_> = page.products.iter().map(|p| p.product.name.as_str()).collect();
        assert_eq!(names, vec!["Bravo", "Charlie"]);
        assert!(page.has_more);
        assert_eq!(page.next_offset, Some(3));
        assert!(page.products.iter().all(|p| p.product.subcategory_id == sub));
    }

    #[tokio::test]
    async fn listing_projects_price_range_and_stock() {
        let (actions, store) = actions();
        let sub = subcategory(&store, "Ropa", "Camisetas", "Manga corta").await;
        let id = product(&store, "Camiseta", 1000, sub).await;
        product(&store, "Sin variantes", 700, sub).await;
        for (price, stock) in [(800, 0), (1200, 0)] {
            store.insert_variant(&NewVariant { product_id: id, price, stock }).await.unwrap();
        }

        let page = actions.public_products(&ProductFilter::default(), Page::default()).await.unwrap();
        let camiseta = &page.products[0];
        assert_eq!((camiseta.min_price, camiseta.max_price), (800, 1200));
        assert_eq!(camiseta.variant_count, 2);
        assert!(!camiseta.has_stock);
        assert!(page.products[1].has_stock);
        assert_eq!(camiseta.taxonomy.as_ref().unwrap().family.as_ref().unwrap().name, "Ropa");
        assert!(!page.has_more);
        assert_eq!(page.next_offset, None);
    }

    #[tokio::test]
    async fn family_filter_and_price_bounds_combine() {
        let (actions, store) = actions();
        let ropa = subcategory(&store, "Ropa", "Camisetas", "Manga corta").await;
        let hogar = subcategory(&store, "Hogar", "Cocina", "Tazas").await;
        product(&store, "Barata", 500, ropa).await;
        product(&store, "Cara", 5000, ropa).await;
        product(&store, "Taza", 900, hogar).await;
        let family = store.list_families().await.unwrap().into_iter().find(|f| f.name == "Ropa").unwrap();

        let filter = ProductFilter::new(TaxonomyScope::Family(family.id), Some(1000), None);
        assert_eq!(actions.product_count(&filter).await.unwrap(), 1);
        let page = actions.public_products(&filter, Page::default()).await.unwrap();
        assert_eq!(page.products[0].product.name, "Cara");
    }

    #[tokio::test]
    async fn filters_default_price_range_when_empty() {
        let (actions, store) = actions();
        let data = actions.filters_data().await.unwrap();
        assert_eq!(data.price_range, DEFAULT_PRICE_RANGE);

        let sub = subcategory(&store, "Ropa", "Camisetas", "Manga corta").await;
        product(&store, "A", 300, sub).await;
        product(&store, "B", 4500, sub).await;
        let data = actions.filters_data().await.unwrap();
        assert_eq!(data.price_range, PriceRange { min: 300, max: 4500 });
        assert_eq!(data.families.len(), 1);
    }

    #[tokio::test]
    async fn slug_lookup_uses_trailing_id() {
        let (actions, store) = actions();
        let sub = subcategory(&store, "Ropa", "Camisetas", "Manga corta").await;
        let id = product(&store, "Camiseta Roja", 1999, sub).await;

        let detail = actions.product_by_slug(&format!("cualquier-cosa-{id}")).await.unwrap();
        assert_eq!(detail.product.id, id);
        assert_eq!(
            actions.product_by_slug("no-id-here-xyz").await.unwrap_err(),
            ActionError::InvalidId("Slug de producto inválido".into())
        );
        assert_eq!(
            actions.product_by_slug("camiseta-999").await.unwrap_err(),
            ActionError::NotFound("Producto no encontrado".into())
        );
    }

    #[tokio::test]
    async fn meta_and_sitemap() {
        let (actions, store) = actions();
        let sub = subcategory(&store, "Ropa", "Camisetas", "Manga corta").await;
        let id = product(&store, "Camiseta Roja", 1999, sub).await;

        let meta = actions.product_meta("https://tienda.test", &format!("camiseta-roja-{id}")).await;
        assert_eq!(meta.canonical_url, format!("https://tienda.test/camiseta-roja-{id}"));
        assert!(meta.json_ld.is_some());
        let missing = actions.product_meta("https://tienda.test", "nada").await;
        assert_eq!(missing.title, "Producto no encontrado");

        let filter = ProductFilter::new(TaxonomyScope::Subcategory(sub), None, None);
        let listing = actions.listing_meta("https://tienda.test", &filter).await;
        assert!(listing.title.contains("Manga corta"));

        let entries = actions.sitemap("https://tienda.test", Utc::now()).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].url, format!("https://tienda.test/camiseta-roja-{id}"));
    }

    #[tokio::test]
    async fn sitemap_degrades_on_store_failure() {
        let (actions, store) = actions();
        store.fail_on("list_products", 0);
        let entries = actions.sitemap("https://tienda.test", Utc::now()).await;
        assert_eq!(entries.len(), 1);
    }
}
