//! Product aggregate: admin listing, detail, creation and cascading delete.
//!
//! Creation is a sequence of single-row writes. Each write that succeeds
//! pushes its inverse onto an undo list; when a later write fails the list is
//! replayed in reverse, so a failed creation leaves no rows behind.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use vitrina_catalog::options::{attach_features, select_in_order};
use vitrina_catalog::{
    EntityKind, FeatureWithOption, OptionWithFeatures, Product, ProductCreation, ProductDetail,
    ProductWithSubcategory, TaxonomyChain, ValidatedProduct, VariantPlanner, VariantStub,
    VariantWithFeatures,
};
use vitrina_core::{FeatureId, OptionId, ProductId, SubcategoryId, VariantId};

use super::{failed, ActionError, ActionResult, CatalogActions};
use crate::store::{CatalogStore, StoreResult};

/// Inverse of one successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Undo {
    Product(ProductId),
    OptionLink(ProductId, OptionId),
    Variant(VariantId),
    VariantFeature(VariantId, FeatureId),
}

impl Undo {
    async fn run(self, store: &dyn CatalogStore) -> StoreResult<()> {
        match self {
            Undo::Product(id) => store.delete_product(id).await.map(drop),
            Undo::OptionLink(product_id, option_id) => store.delete_option_link(product_id, option_id).await,
            Undo::Variant(id) => store.delete_variant(id).await,
            Undo::VariantFeature(variant_id, feature_id) => {
                store.delete_variant_feature(variant_id, feature_id).await
            }
        }
    }
}

struct Compensation<'a> {
    store: &'a dyn CatalogStore,
    undo: Vec<Undo>,
}

impl<'a> Compensation<'a> {
    fn new(store: &'a dyn CatalogStore) -> Self {
        Self { store, undo: Vec::new() }
    }

    fn record(&mut self, undo: Undo) {
        self.undo.push(undo);
    }

    /// Replay in reverse. An undo that fails is logged and skipped.
    async fn rollback(self) {
        for step in self.undo.into_iter().rev() {
            if let Err(err) = step.run(self.store).await {
                warn!(error = %err, step = ?step, "compensating delete failed");
            }
        }
    }
}

/// Options and base price a variant set is planned against, plus the set
/// built so far.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VariantPlan {
    pub option_ids: Vec<OptionId>,
    pub base_price: u64,
    #[serde(default)]
    pub variants: Vec<VariantStub>,
}

/// One hand-picked combination to add to a plan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManualVariant {
    #[serde(flatten)]
    pub plan: VariantPlan,
    pub feature_ids: Vec<FeatureId>,
    #[serde(default)]
    pub price: Option<u64>,
    #[serde(default)]
    pub stock: i64,
}

/// Price and/or stock change for the planned variant at `index`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlannedVariantEdit {
    #[serde(flatten)]
    pub plan: VariantPlan,
    pub index: usize,
    #[serde(default)]
    pub price: Option<u64>,
    #[serde(default)]
    pub stock: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlannedVariantRemoval {
    #[serde(flatten)]
    pub plan: VariantPlan,
    pub index: usize,
}

impl CatalogActions {
    /// Every product with its subcategory, ordered by name.
    pub async fn list_products_admin(&self) -> ActionResult<Vec<ProductWithSubcategory>> {
        let list_failed = EntityKind::Product.list_failed();
        let (products, subcategories) =
            tokio::join!(self.store.list_products(), self.store.list_subcategories());
        let products = products.map_err(failed(list_failed.clone()))?;
        let subcategories = subcategories.map_err(failed(list_failed))?;
        Ok(products
            .into_iter()
            .map(|product| {
                let subcategory = subcategories.iter().find(|s| s.id == product.subcategory_id).cloned();
                ProductWithSubcategory { product, subcategory }
            })
            .collect())
    }

    pub async fn product_detail(&self, id: ProductId) -> ActionResult<ProductDetail> {
        let load_failed = EntityKind::Product.load_failed();
        let product = self
            .store
            .get_product(id)
            .await
            .map_err(failed(load_failed.clone()))?
            .ok_or_else(|| ActionError::NotFound(EntityKind::Product.not_found()))?;
        self.load_detail(product).await.map_err(failed(load_failed))
    }

    /// Subcategory with whatever ancestors still exist.
    pub(crate) async fn chain_for(&self, subcategory_id: SubcategoryId) -> StoreResult<Option<TaxonomyChain>> {
        let Some(subcategory) = self.store.get_subcategory(subcategory_id).await? else {
            return Ok(None);
        };
        let category = self.store.get_category(subcategory.category_id).await?;
        let family = match &category {
            Some(c) => self.store.get_family(c.family_id).await?,
            None => None,
        };
        Ok(Some(TaxonomyChain { subcategory, category, family }))
    }

    async fn all_options(&self) -> StoreResult<Vec<OptionWithFeatures>> {
        let options = self.store.list_options().await?;
        let features = self.store.list_features().await?;
        Ok(attach_features(options, &features))
    }

    pub(crate) async fn load_detail(&self, product: Product) -> StoreResult<ProductDetail> {
        let taxonomy = self.chain_for(product.subcategory_id).await?;
        let catalog_options = self.all_options().await?;
        let linked = self.store.list_option_links(product.id).await?;
        let options = select_in_order(&catalog_options, &linked);

        let variants = self.store.list_variants(&[product.id]).await?;
        let variant_ids: Vec<VariantId> = variants.iter().map(|v| v.id).collect();
        let links = self.store.list_variant_features(&variant_ids).await?;

        let mut feature_index: HashMap<FeatureId, FeatureWithOption> = HashMap::new();
        for option in &catalog_options {
            for feature in &option.features {
                feature_index.insert(
                    feature.id,
                    FeatureWithOption { feature: feature.clone(), option: option.option.clone() },
                );
            }
        }

        let variants = variants
            .into_iter()
            .map(|variant| {
                let features = links
                    .iter()
                    .filter(|l| l.variant_id == variant.id)
                    .filter_map(|l| feature_index.get(&l.feature_id).cloned())
                    .collect();
                VariantWithFeatures { variant, features }
            })
            .collect();

        Ok(ProductDetail { product, taxonomy, options, variants })
    }

    /// Write product, option links and variants. On any store failure the
    /// rows written so far are removed again.
    #[instrument(skip(self, request), fields(sku = %request.basic_info.sku))]
    pub async fn create_product(&self, request: &ProductCreation) -> ActionResult<Product> {
        let validated = request.validate()?;
        let mut compensation = Compensation::new(self.store.as_ref());
        match self.write_product(&validated, &mut compensation).await {
            Ok(product) => {
                info!(
                    product_id = %product.id,
                    options = validated.option_ids.len(),
                    variants = validated.variants.len(),
                    "product created"
                );
                self.revalidator.notify(EntityKind::Product.admin_path());
                Ok(product)
            }
            Err(err) => {
                let message = EntityKind::Product.create_failed();
                error!(error = %err, "{message}");
                compensation.rollback().await;
                Err(ActionError::Failed(message))
            }
        }
    }

    async fn write_product(
        &self,
        validated: &ValidatedProduct,
        compensation: &mut Compensation<'_>,
    ) -> StoreResult<Product> {
        let product = self.store.insert_product(&validated.product).await?;
        compensation.record(Undo::Product(product.id));

        for option_id in &validated.option_ids {
            self.store.insert_option_link(product.id, *option_id).await?;
            compensation.record(Undo::OptionLink(product.id, *option_id));
        }

        for spec in &validated.variants {
            let variant = self.store.insert_variant(&validated.new_variant(spec, product.id)).await?;
            compensation.record(Undo::Variant(variant.id));
            for feature_id in &spec.feature_ids {
                self.store.insert_variant_feature(variant.id, *feature_id).await?;
                compensation.record(Undo::VariantFeature(variant.id, *feature_id));
            }
        }
        Ok(product)
    }

    /// Remove a product and everything hanging off it, leaves first.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> ActionResult<()> {
        let delete_failed = EntityKind::Product.delete_failed();
        if self
            .store
            .get_product(id)
            .await
            .map_err(failed(delete_failed.clone()))?
            .is_none()
        {
            return Err(ActionError::NotFound(EntityKind::Product.not_found()));
        }
        self.cascade_delete(id).await.map_err(failed(delete_failed))?;
        info!(product_id = %id, "product deleted");
        self.revalidator.notify(EntityKind::Product.admin_path());
        Ok(())
    }

    async fn cascade_delete(&self, id: ProductId) -> StoreResult<()> {
        let variants = self.store.list_variants(&[id]).await?;
        if !variants.is_empty() {
            let variant_ids: Vec<VariantId> = variants.iter().map(|v| v.id).collect();
            self.store.delete_variant_features(&variant_ids).await?;
            self.store.delete_variants(id).await?;
        }
        self.store.delete_option_links(id).await?;
        self.store.delete_product(id).await?;
        Ok(())
    }

    async fn planner(&self, plan: &VariantPlan) -> ActionResult<VariantPlanner> {
        let options = self
            .all_options()
            .await
            .map_err(failed(EntityKind::Option.list_failed()))?;
        let selected = select_in_order(&options, &plan.option_ids);
        Ok(VariantPlanner::new(selected, plan.base_price).with_variants(plan.variants.clone()))
    }

    /// Fill an empty plan with every combination of the selected options.
    pub async fn generate_variants(&self, plan: &VariantPlan) -> ActionResult<Vec<VariantStub>> {
        let mut planner = self.planner(plan).await?;
        planner.generate_all()?;
        Ok(planner.into_variants())
    }

    pub async fn add_manual_variant(&self, request: &ManualVariant) -> ActionResult<Vec<VariantStub>> {
        let mut planner = self.planner(&request.plan).await?;
        planner.add_manual(&request.feature_ids, request.price, request.stock)?;
        Ok(planner.into_variants())
    }

    pub async fn edit_planned_variant(&self, request: &PlannedVariantEdit) -> ActionResult<Vec<VariantStub>> {
        let mut planner = self.planner(&request.plan).await?;
        if let Some(price) = request.price {
            planner.set_price(request.index, price)?;
        }
        if let Some(stock) = request.stock {
            planner.set_stock(request.index, stock)?;
        }
        Ok(planner.into_variants())
    }

    pub async fn remove_planned_variant(&self, request: &PlannedVariantRemoval) -> ActionResult<Vec<VariantStub>> {
        let mut planner = self.planner(&request.plan).await?;
        planner.remove(request.index)?;
        Ok(planner.into_variants())
    }
}

#[cfg(test)]
mod tests {
    use vitrina_catalog::{DeleteBlocker, ProductBasicInfo, VariantInput};

    use super::*;
    use crate::actions::test_support::{actions, option, subcategory};

    fn creation(sub: SubcategoryId, options: Vec<OptionId>, variants: Vec<Vec<FeatureId>>) -> ProductCreation {
        ProductCreation {
            basic_info: ProductBasicInfo {
                name: "Camiseta básica".into(),
                sku: "CAM-001".into(),
                price: 1999,
                detail: None,
                image_path: None,
                subcategory_id: sub,
            },
            selected_options: options,
            variants: variants
                .into_iter()
                .map(|feature_ids| VariantInput { feature_ids, price: None, stock: Some(3) })
                .collect(),
        }
    }

    #[tokio::test]
    async fn creates_the_whole_aggregate() {
        let (actions, store) = actions();
        let sub = subcategory(&store, "Ropa", "Camisetas", "Manga corta").await;
        let (talla, sizes) = option(&store, "Talla", &["S", "M"]).await;
        let (color, colors) = option(&store, "Color", &["Rojo"]).await;

        let request = creation(
            sub,
            vec![talla, color],
            vec![vec![sizes[0], colors[0]], vec![sizes[1], colors[0]]],
        );
        let product = actions.create_product(&request).await.unwrap();
        assert_eq!(store.link_counts(), (2, 4));

        let detail = actions.product_detail(product.id).await.unwrap();
        assert_eq!(detail.options.len(), 2);
        assert_eq!(detail.options[0].option.name, "Talla");
        assert_eq!(detail.variants.len(), 2);
        assert_eq!(detail.variants[0].variant.price, Some(1999));
        assert_eq!(detail.variants[0].features[1].option.name, "Color");
        assert_eq!(detail.taxonomy.unwrap().family.unwrap().name, "Ropa");
    }

    #[tokio::test]
    async fn failed_write_leaves_no_partial_product() {
        let (actions, store) = actions();
        let sub = subcategory(&store, "Ropa", "Camisetas", "Manga corta").await;
        let (talla, sizes) = option(&store, "Talla", &["S", "M"]).await;
        store.fail_on("insert_variant_feature", 1);

        let request = creation(sub, vec![talla], vec![vec![sizes[0]], vec![sizes[1]]]);
        let err = actions.create_product(&request).await.unwrap_err();
        assert_eq!(err, ActionError::Failed("Error al crear el producto".into()));

        assert!(store.list_products().await.unwrap().is_empty());
        assert!(store.list_all_variants().await.unwrap().is_empty());
        assert_eq!(store.link_counts(), (0, 0));
    }

    #[tokio::test]
    async fn failed_undo_does_not_mask_the_original_error() {
        let (actions, store) = actions();
        let sub = subcategory(&store, "Ropa", "Camisetas", "Manga corta").await;
        let (talla, sizes) = option(&store, "Talla", &["S"]).await;
        store.fail_on("insert_variant", 0);
        store.fail_on("delete_option_link", 0);

        let request = creation(sub, vec![talla], vec![vec![sizes[0]]]);
        let err = actions.create_product(&request).await.unwrap_err();
        assert_eq!(err.message(), "Error al crear el producto");
        // The product row is still removed even though one undo failed.
        assert!(store.list_products().await.unwrap().is_empty());
        assert_eq!(store.link_counts(), (1, 0));
    }

    #[tokio::test]
    async fn invalid_request_writes_nothing() {
        let (actions, store) = actions();
        let sub = subcategory(&store, "Ropa", "Camisetas", "Manga corta").await;
        let err = actions.create_product(&creation(sub, vec![], vec![])).await.unwrap_err();
        assert_eq!(err, ActionError::Validation("Debe crear al menos una variante".into()));
        assert!(store.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_cascades_through_links() {
        let (actions, store) = actions();
        let sub = subcategory(&store, "Ropa", "Camisetas", "Manga corta").await;
        let (talla, sizes) = option(&store, "Talla", &["S", "M"]).await;
        let product = actions
            .create_product(&creation(sub, vec![talla], vec![vec![sizes[0]], vec![sizes[1]]]))
            .await
            .unwrap();

        actions.delete_product(product.id).await.unwrap();
        assert!(store.list_all_variants().await.unwrap().is_empty());
        assert_eq!(store.link_counts(), (0, 0));
        assert_eq!(
            actions.delete_product(product.id).await.unwrap_err(),
            ActionError::NotFound("Producto no encontrado".into())
        );
    }

    #[tokio::test]
    async fn admin_listing_joins_subcategory() {
        let (actions, store) = actions();
        let sub = subcategory(&store, "Ropa", "Camisetas", "Manga corta").await;
        let (talla, sizes) = option(&store, "Talla", &["S"]).await;
        actions.create_product(&creation(sub, vec![talla], vec![vec![sizes[0]]])).await.unwrap();
        let listed = actions.list_products_admin().await.unwrap();
        assert_eq!(listed[0].subcategory.as_ref().unwrap().name, "Manga corta");
    }

    #[tokio::test]
    async fn planning_generates_then_rejects_regeneration() {
        let (actions, store) = actions();
        let (talla, _) = option(&store, "Talla", &["S", "M", "L"]).await;
        let (color, _) = option(&store, "Color", &["Rojo", "Azul"]).await;

        let plan = VariantPlan { option_ids: vec![talla, color], base_price: 1500, variants: vec![] };
        let variants = actions.generate_variants(&plan).await.unwrap();
        assert_eq!(variants.len(), 6);
        assert!(variants.iter().all(|v| v.price == 1500 && v.stock == 0));

        let again = VariantPlan { variants, ..plan.clone() };
        assert!(matches!(actions.generate_variants(&again).await, Err(ActionError::Validation(_))));

        let none = VariantPlan { option_ids: vec![], ..plan };
        assert!(actions.generate_variants(&none).await.is_err());
    }

    #[tokio::test]
    async fn manual_variant_rejects_duplicates() {
        let (actions, store) = actions();
        let (talla, sizes) = option(&store, "Talla", &["S", "M"]).await;
        let plan = VariantPlan { option_ids: vec![talla], base_price: 900, variants: vec![] };
        let request = ManualVariant { plan, feature_ids: vec![sizes[1]], price: None, stock: 4 };
        let variants = actions.add_manual_variant(&request).await.unwrap();
        assert_eq!(variants.len(), 1);

        let again = ManualVariant {
            plan: VariantPlan { variants, ..request.plan.clone() },
            ..request
        };
        assert_eq!(
            actions.add_manual_variant(&again).await.unwrap_err(),
            ActionError::Validation("Ya existe una variante con esa combinación".into())
        );
    }

    #[tokio::test]
    async fn option_linked_to_a_product_cannot_be_deleted() {
        let (actions, store) = actions();
        let sub = subcategory(&store, "Ropa", "Camisetas", "Manga corta").await;
        let (color, colors) = option(&store, "Color", &["Rojo"]).await;
        let (talla, _) = option(&store, "Talla", &[]).await;
        let product = actions
            .create_product(&creation(sub, vec![color, talla], vec![vec![colors[0]]]))
            .await
            .unwrap();

        assert_eq!(
            actions.delete_option(talla).await.unwrap_err(),
            ActionError::Blocked(DeleteBlocker::OptionInUse)
        );
        assert!(store.get_option(talla).await.unwrap().is_some());
        assert_eq!(store.list_option_links(product.id).await.unwrap(), vec![color, talla]);

        actions.delete_product(product.id).await.unwrap();
        actions.delete_option(talla).await.unwrap();
    }

    #[tokio::test]
    async fn planned_variants_can_be_edited_and_removed() {
        let (actions, store) = actions();
        let (talla, _) = option(&store, "Talla", &["S", "M"]).await;
        let plan = VariantPlan { option_ids: vec![talla], base_price: 1000, variants: vec![] };
        let variants = actions.generate_variants(&plan).await.unwrap();
        let plan = VariantPlan { variants, ..plan };

        let edit = PlannedVariantEdit { plan: plan.clone(), index: 1, price: Some(1250), stock: Some(7) };
        let edited = actions.edit_planned_variant(&edit).await.unwrap();
        assert_eq!((edited[1].price, edited[1].stock), (1250, 7));
        assert_eq!(edited[0].price, 1000);

        let negative = PlannedVariantEdit { stock: Some(-1), price: None, ..edit.clone() };
        assert!(matches!(actions.edit_planned_variant(&negative).await, Err(ActionError::Validation(_))));

        let removal = PlannedVariantRemoval { plan: VariantPlan { variants: edited, ..plan }, index: 0 };
        let remaining = actions.remove_planned_variant(&removal).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].price, 1250);

        let out_of_range = PlannedVariantRemoval { index: 5, ..removal };
        assert!(matches!(actions.remove_planned_variant(&out_of_range).await, Err(ActionError::NotFound(_))));
    }
}
