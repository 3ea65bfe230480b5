//! In-memory catalog store for tests and local development.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use vitrina_auth::{Profile, ProfileUpdate};
use vitrina_catalog::{
    Category, CategoryInput, Family, FamilyInput, Feature, FeatureInput, NewProduct, NewVariant,
    OptionInput, OptionProduct, Page, Product, ProductFilter, ProductOption, Subcategory,
    SubcategoryInput, TaxonomyChain, Variant, VariantFeature,
};
use vitrina_core::{
    CategoryId, FamilyId, FeatureId, OptionId, ProductId, SubcategoryId, UserId, VariantId,
};

use super::{CatalogStore, ProfileStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Tables {
    seq: i64,
    families: BTreeMap<FamilyId, Family>,
    categories: BTreeMap<CategoryId, Category>,
    subcategories: BTreeMap<SubcategoryId, Subcategory>,
    options: BTreeMap<OptionId, ProductOption>,
    features: BTreeMap<FeatureId, Feature>,
    products: BTreeMap<ProductId, Product>,
    option_links: Vec<OptionProduct>,
    variants: BTreeMap<VariantId, Variant>,
    variant_features: Vec<VariantFeature>,
    profiles: HashMap<UserId, Profile>,
}

impl Tables {
    /// One sequence shared by every table; ids are unique store-wide.
    fn next_id(&mut self) -> i64 {
        self.seq += 1;
        self.seq
    }

    /// Ancestor chain, present only when every level exists.
    fn complete_chain(&self, subcategory_id: SubcategoryId) -> Option<TaxonomyChain> {
        let subcategory = self.subcategories.get(&subcategory_id)?;
        let category = self.categories.get(&subcategory.category_id)?;
        let family = self.families.get(&category.family_id)?;
        Some(TaxonomyChain {
            subcategory: subcategory.clone(),
            category: Some(category.clone()),
            family: Some(family.clone()),
        })
    }

    fn matching_products(&self, filter: &ProductFilter) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .values()
            .filter(|p| {
                self.complete_chain(p.subcategory_id)
                    .is_some_and(|chain| filter.matches(p, Some(&chain)))
            })
            .cloned()
            .collect();
        sort_by_name(&mut products, |p| (&p.name, p.id.get()));
        products
    }
}

fn sort_by_name<T>(rows: &mut [T], key: impl Fn(&T) -> (&String, i64)) {
    rows.sort_by(|a, b| key(a).cmp(&key(b)));
}

/// `RwLock`-guarded tables with optional fault injection.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<Tables>,
    faults: Mutex<HashMap<&'static str, usize>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the operation named `operation` fail once, after `successes`
    /// more successful calls. Used to exercise failure paths.
    pub fn fail_on(&self, operation: &'static str, successes: usize) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.insert(operation, successes);
        }
    }

    fn check_fault(&self, operation: &'static str) -> StoreResult<()> {
        let Ok(mut faults) = self.faults.lock() else {
            return Ok(());
        };
        match faults.get_mut(operation) {
            Some(0) => {
                faults.remove(operation);
                Err(StoreError::backend(operation, "injected failure"))
            }
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn read(&self, operation: &'static str) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.check_fault(operation)?;
        self.inner
            .read()
            .map_err(|_| StoreError::backend(operation, "lock poisoned"))
    }

    fn write(&self, operation: &'static str) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.check_fault(operation)?;
        self.inner
            .write()
            .map_err(|_| StoreError::backend(operation, "lock poisoned"))
    }

    /// Snapshot of the link tables, for assertions.
    pub fn link_counts(&self) -> (usize, usize) {
        self.inner
            .read()
            .map(|t| (t.option_links.len(), t.variant_features.len()))
            .unwrap_or((0, 0))
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn list_families(&self) -> StoreResult<Vec<Family>> {
        let t = self.read("list_families")?;
        let mut rows: Vec<Family> = t.families.values().cloned().collect();
        sort_by_name(&mut rows, |f| (&f.name, f.id.get()));
        Ok(rows)
    }

    async fn get_family(&self, id: FamilyId) -> StoreResult<Option<Family>> {
        Ok(self.read("get_family")?.families.get(&id).cloned())
    }

    async fn insert_family(&self, input: &FamilyInput) -> StoreResult<Family> {
        let mut t = self.write("insert_family")?;
        let family = Family { id: FamilyId::new(t.next_id()), name: input.name.clone() };
        t.families.insert(family.id, family.clone());
        Ok(family)
    }

    async fn update_family(&self, id: FamilyId, input: &FamilyInput) -> StoreResult<Option<Family>> {
        let mut t = self.write("update_family")?;
        Ok(t.families.get_mut(&id).map(|f| {
            f.name = input.name.clone();
            f.clone()
        }))
    }

    async fn delete_family(&self, id: FamilyId) -> StoreResult<bool> {
        Ok(self.write("delete_family")?.families.remove(&id).is_some())
    }

    async fn family_has_categories(&self, id: FamilyId) -> StoreResult<bool> {
        Ok(self.read("family_has_categories")?.categories.values().any(|c| c.family_id == id))
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let t = self.read("list_categories")?;
        let mut rows: Vec<Category> = t.categories.values().cloned().collect();
        sort_by_name(&mut rows, |c| (&c.name, c.id.get()));
        Ok(rows)
    }

    async fn get_category(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        Ok(self.read("get_category")?.categories.get(&id).cloned())
    }

    async fn insert_category(&self, input: &CategoryInput) -> StoreResult<Category> {
        let mut t = self.write("insert_category")?;
        let category = Category {
            id: CategoryId::new(t.next_id()),
            name: input.name.clone(),
            family_id: input.family_id,
        };
        t.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: CategoryId, input: &CategoryInput) -> StoreResult<Option<Category>> {
        let mut t = self.write("update_category")?;
        Ok(t.categories.get_mut(&id).map(|c| {
            c.name = input.name.clone();
            c.family_id = input.family_id;
            c.clone()
        }))
    }

    async fn delete_category(&self, id: CategoryId) -> StoreResult<bool> {
        Ok(self.write("delete_category")?.categories.remove(&id).is_some())
    }

    async fn category_has_subcategories(&self, id: CategoryId) -> StoreResult<bool> {
        Ok(self
            .read("category_has_subcategories")?
            .subcategories
            .values()
            .any(|s| s.category_id == id))
    }

    async fn list_subcategories(&self) -> StoreResult<Vec<Subcategory>> {
        let t = self.read("list_subcategories")?;
        let mut rows: Vec<Subcategory> = t.subcategories.values().cloned().collect();
        sort_by_name(&mut rows, |s| (&s.name, s.id.get()));
        Ok(rows)
    }

    async fn get_subcategory(&self, id: SubcategoryId) -> StoreResult<Option<Subcategory>> {
        Ok(self.read("get_subcategory")?.subcategories.get(&id).cloned())
    }

    async fn insert_subcategory(&self, input: &SubcategoryInput) -> StoreResult<Subcategory> {
        let mut t = self.write("insert_subcategory")?;
        let sub = Subcategory {
            id: SubcategoryId::new(t.next_id()),
            name: input.name.clone(),
            category_id: input.category_id,
        };
        t.subcategories.insert(sub.id, sub.clone());
        Ok(sub)
    }

    async fn update_subcategory(
        &self,
        id: SubcategoryId,
        input: &SubcategoryInput,
    ) -> StoreResult<Option<Subcategory>> {
        let mut t = self.write("update_subcategory")?;
        Ok(t.subcategories.get_mut(&id).map(|s| {
            s.name = input.name.clone();
            s.category_id = input.category_id;
            s.clone()
        }))
    }

    async fn delete_subcategory(&self, id: SubcategoryId) -> StoreResult<bool> {
        Ok(self.write("delete_subcategory")?.subcategories.remove(&id).is_some())
    }

    async fn subcategory_has_products(&self, id: SubcategoryId) -> StoreResult<bool> {
        Ok(self
            .read("subcategory_has_products")?
            .products
            .values()
            .any(|p| p.subcategory_id == id))
    }

    async fn list_options(&self) -> StoreResult<Vec<ProductOption>> {
        let t = self.read("list_options")?;
        let mut rows: Vec<ProductOption> = t.options.values().cloned().collect();
        sort_by_name(&mut rows, |o| (&o.name, o.id.get()));
        Ok(rows)
    }

    async fn get_option(&self, id: OptionId) -> StoreResult<Option<ProductOption>> {
        Ok(self.read("get_option")?.options.get(&id).cloned())
    }

    async fn insert_option(&self, input: &OptionInput) -> StoreResult<ProductOption> {
        let mut t = self.write("insert_option")?;
        let option = ProductOption { id: OptionId::new(t.next_id()), name: input.name.clone() };
        t.options.insert(option.id, option.clone());
        Ok(option)
    }

    async fn update_option(&self, id: OptionId, input: &OptionInput) -> StoreResult<Option<ProductOption>> {
        let mut t = self.write("update_option")?;
        Ok(t.options.get_mut(&id).map(|o| {
            o.name = input.name.clone();
            o.clone()
        }))
    }

    async fn delete_option(&self, id: OptionId) -> StoreResult<bool> {
        Ok(self.write("delete_option")?.options.remove(&id).is_some())
    }

    async fn option_has_features(&self, id: OptionId) -> StoreResult<bool> {
        Ok(self.read("option_has_features")?.features.values().any(|f| f.option_id == id))
    }

    async fn option_in_use(&self, id: OptionId) -> StoreResult<bool> {
        Ok(self.read("option_in_use")?.option_links.iter().any(|l| l.option_id == id))
    }

    async fn list_features(&self) -> StoreResult<Vec<Feature>> {
        let t = self.read("list_features")?;
        let mut rows: Vec<Feature> = t.features.values().cloned().collect();
        sort_by_name(&mut rows, |f| (&f.value, f.id.get()));
        Ok(rows)
    }

    async fn get_feature(&self, id: FeatureId) -> StoreResult<Option<Feature>> {
        Ok(self.read("get_feature")?.features.get(&id).cloned())
    }

    async fn insert_feature(&self, input: &FeatureInput) -> StoreResult<Feature> {
        let mut t = self.write("insert_feature")?;
        let feature = Feature {
            id: FeatureId::new(t.next_id()),
            value: input.value.clone(),
            option_id: input.option_id,
        };
        t.features.insert(feature.id, feature.clone());
        Ok(feature)
    }

    async fn update_feature(&self, id: FeatureId, input: &FeatureInput) -> StoreResult<Option<Feature>> {
        let mut t = self.write("update_feature")?;
        Ok(t.features.get_mut(&id).map(|f| {
            f.value = input.value.clone();
            f.option_id = input.option_id;
            f.clone()
        }))
    }

    async fn delete_feature(&self, id: FeatureId) -> StoreResult<bool> {
        Ok(self.write("delete_feature")?.features.remove(&id).is_some())
    }

    async fn feature_in_use(&self, id: FeatureId) -> StoreResult<bool> {
        Ok(self
            .read("feature_in_use")?
            .variant_features
            .iter()
            .any(|vf| vf.feature_id == id))
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let t = self.read("list_products")?;
        let mut rows: Vec<Product> = t.products.values().cloned().collect();
        sort_by_name(&mut rows, |p| (&p.name, p.id.get()));
        Ok(rows)
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        Ok(self.read("get_product")?.products.get(&id).cloned())
    }

    async fn insert_product(&self, product: &NewProduct) -> StoreResult<Product> {
        let mut t = self.write("insert_product")?;
        let product = product.clone().into_product(ProductId::new(t.next_id()));
        t.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<bool> {
        Ok(self.write("delete_product")?.products.remove(&id).is_some())
    }

    async fn query_products(&self, filter: &ProductFilter, page: Page) -> StoreResult<Vec<Product>> {
        let t = self.read("query_products")?;
        Ok(page.apply(t.matching_products(filter)))
    }

    async fn count_products(&self, filter: &ProductFilter) -> StoreResult<u64> {
        let t = self.read("count_products")?;
        Ok(t.matching_products(filter).len() as u64)
    }

    async fn insert_option_link(&self, product_id: ProductId, option_id: OptionId) -> StoreResult<()> {
        let mut t = self.write("insert_option_link")?;
        t.option_links.push(OptionProduct { product_id, option_id });
        Ok(())
    }

    async fn delete_option_link(&self, product_id: ProductId, option_id: OptionId) -> StoreResult<()> {
        let mut t = self.write("delete_option_link")?;
        t.option_links
            .retain(|l| !(l.product_id == product_id && l.option_id == option_id));
        Ok(())
    }

    async fn delete_option_links(&self, product_id: ProductId) -> StoreResult<()> {
        let mut t = self.write("delete_option_links")?;
        t.option_links.retain(|l| l.product_id != product_id);
        Ok(())
    }

    async fn list_option_links(&self, product_id: ProductId) -> StoreResult<Vec<OptionId>> {
        let t = self.read("list_option_links")?;
        Ok(t.option_links
            .iter()
            .filter(|l| l.product_id == product_id)
            .map(|l| l.option_id)
            .collect())
    }

    async fn insert_variant(&self, variant: &NewVariant) -> StoreResult<Variant> {
        let mut t = self.write("insert_variant")?;
        let variant = Variant {
            id: VariantId::new(t.next_id()),
            product_id: variant.product_id,
            price: Some(variant.price),
            stock: variant.stock,
        };
        t.variants.insert(variant.id, variant.clone());
        Ok(variant)
    }

    async fn delete_variant(&self, id: VariantId) -> StoreResult<()> {
        self.write("delete_variant")?.variants.remove(&id);
        Ok(())
    }

    async fn delete_variants(&self, product_id: ProductId) -> StoreResult<()> {
        let mut t = self.write("delete_variants")?;
        t.variants.retain(|_, v| v.product_id != product_id);
        Ok(())
    }

    async fn list_variants(&self, product_ids: &[ProductId]) -> StoreResult<Vec<Variant>> {
        let t = self.read("list_variants")?;
        Ok(t.variants
            .values()
            .filter(|v| product_ids.contains(&v.product_id))
            .cloned()
            .collect())
    }

    async fn list_all_variants(&self) -> StoreResult<Vec<Variant>> {
        Ok(self.read("list_all_variants")?.variants.values().cloned().collect())
    }

    async fn insert_variant_feature(&self, variant_id: VariantId, feature_id: FeatureId) -> StoreResult<()> {
        let mut t = self.write("insert_variant_feature")?;
        t.variant_features.push(VariantFeature { variant_id, feature_id });
        Ok(())
    }

    async fn delete_variant_feature(&self, variant_id: VariantId, feature_id: FeatureId) -> StoreResult<()> {
        let mut t = self.write("delete_variant_feature")?;
        t.variant_features
            .retain(|vf| !(vf.variant_id == variant_id && vf.feature_id == feature_id));
        Ok(())
    }

    async fn delete_variant_features(&self, variant_ids: &[VariantId]) -> StoreResult<()> {
        let mut t = self.write("delete_variant_features")?;
        t.variant_features.retain(|vf| !variant_ids.contains(&vf.variant_id));
        Ok(())
    }

    async fn list_variant_features(&self, variant_ids: &[VariantId]) -> StoreResult<Vec<VariantFeature>> {
        let t = self.read("list_variant_features")?;
        Ok(t.variant_features
            .iter()
            .filter(|vf| variant_ids.contains(&vf.variant_id))
            .copied()
            .collect())
    }
}

#[async_trait::async_trait]
impl ProfileStore for InMemoryCatalogStore {
    async fn list_profiles(&self) -> StoreResult<Vec<Profile>> {
        let t = self.read("list_profiles")?;
        let mut rows: Vec<Profile> = t.profiles.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get_profile(&self, id: UserId) -> StoreResult<Option<Profile>> {
        Ok(self.read("get_profile")?.profiles.get(&id).cloned())
    }

    async fn upsert_profile(&self, profile: &Profile) -> StoreResult<Profile> {
        let mut t = self.write("upsert_profile")?;
        let stored = match t.profiles.get(&profile.id) {
            Some(existing) => Profile { created_at: existing.created_at, ..profile.clone() },
            None => profile.clone(),
        };
        t.profiles.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Profile>> {
        let mut t = self.write("update_profile")?;
        Ok(t.profiles.get_mut(&id).map(|p| {
            update.apply(p, now);
            p.clone()
        }))
    }

    async fn delete_profile(&self, id: UserId) -> StoreResult<bool> {
        Ok(self.write("delete_profile")?.profiles.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrina_catalog::TaxonomyScope;

    async fn seeded() -> (InMemoryCatalogStore, SubcategoryId, SubcategoryId) {
        let store = InMemoryCatalogStore::new();
        let fam = store.insert_family(&FamilyInput { name: "Ropa".into() }).await.unwrap();
        let cat = store
            .insert_category(&CategoryInput { name: "Camisetas".into(), family_id: fam.id })
            .await
            .unwrap();
        let a = store
            .insert_subcategory(&SubcategoryInput { name: "Manga corta".into(), category_id: cat.id })
            .await
            .unwrap();
        let b = store
            .insert_subcategory(&SubcategoryInput { name: "Manga larga".into(), category_id: cat.id })
            .await
            .unwrap();
        (store, a.id, b.id)
    }

    fn new_product(name: &str, price: u64, sub: SubcategoryId) -> NewProduct {
        NewProduct {
            name: name.into(),
            sku: name.to_uppercase(),
            price,
            detail: None,
            image_path: None,
            subcategory_id: sub,
        }
    }

    #[tokio::test]
    async fn query_filters_orders_and_pages() {
        let (store, a, b) = seeded().await;
        for name in ["Zeta", "Alfa", "Delta", "Beta"] {
            store.insert_product(&new_product(name, 1000, a)).await.unwrap();
        }
        store.insert_product(&new_product("Otro", 1000, b)).await.unwrap();

        let filter = ProductFilter::new(TaxonomyScope::Subcategory(a), None, None);
        let page = store.query_products(&filter, Page::new(1, 2)).await.unwrap();
        let names: Vec<_> = page.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Delta"]);
        assert_eq!(store.count_products(&filter).await.unwrap(), 4);
        assert_eq!(store.count_products(&ProductFilter::default()).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn products_with_broken_chain_are_hidden_from_queries() {
        let store = InMemoryCatalogStore::new();
        store
            .insert_product(&new_product("Huérfano", 500, SubcategoryId::new(999)))
            .await
            .unwrap();
        assert_eq!(store.count_products(&ProductFilter::default()).await.unwrap(), 0);
        assert_eq!(store.list_products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn injected_fault_fires_once_after_successes() {
        let (store, a, _) = seeded().await;
        store.fail_on("insert_product", 1);
        assert!(store.insert_product(&new_product("Uno", 1, a)).await.is_ok());
        assert!(store.insert_product(&new_product("Dos", 1, a)).await.is_err());
        assert!(store.insert_product(&new_product("Tres", 1, a)).await.is_ok());
    }

    #[tokio::test]
    async fn profile_upsert_keeps_creation_time() {
        let store = InMemoryCatalogStore::new();
        let created = Utc::now() - chrono::Duration::days(1);
        let id = UserId::new();
        let profile = Profile { id, full_name: Some("Ana".into()), avatar_url: None, created_at: created, updated_at: None };
        store.upsert_profile(&profile).await.unwrap();
        let again = Profile { full_name: Some("Ana María".into()), created_at: Utc::now(), ..profile };
        let stored = store.upsert_profile(&again).await.unwrap();
        assert_eq!(stored.created_at, created);
        assert_eq!(stored.full_name.as_deref(), Some("Ana María"));
    }
}
