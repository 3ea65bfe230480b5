//! Family → Category → Subcategory maintenance.

use tracing::{info, instrument};

use vitrina_catalog::taxonomy::build_tree;
use vitrina_catalog::{
    Category, CategoryInput, DeleteBlocker, EntityKind, Family, FamilyInput, FamilyNode, Subcategory,
    SubcategoryInput,
};
use vitrina_core::{CategoryId, FamilyId, SubcategoryId};

use super::{failed, ActionError, ActionResult, CatalogActions};

impl CatalogActions {
    /// The whole tree, each level ordered by name.
    pub async fn families_with_relations(&self) -> ActionResult<Vec<FamilyNode>> {
        let list_failed = EntityKind::Family.list_failed();
        let (families, categories, subcategories) = tokio::join!(
            self.store.list_families(),
            self.store.list_categories(),
            self.store.list_subcategories(),
        );
        let families = families.map_err(failed(list_failed.clone()))?;
        let categories = categories.map_err(failed(list_failed.clone()))?;
        let subcategories = subcategories.map_err(failed(list_failed))?;
        Ok(build_tree(families, categories, subcategories))
    }

    #[instrument(skip(self, input))]
    pub async fn create_family(&self, input: &FamilyInput) -> ActionResult<Family> {
        let input = input.validate()?;
        let family = self
            .store
            .insert_family(&input)
            .await
            .map_err(failed(EntityKind::Family.create_failed()))?;
        info!(family_id = %family.id, "family created");
        self.revalidator.notify(EntityKind::Family.admin_path());
        Ok(family)
    }

    #[instrument(skip(self))]
    pub async fn update_family(&self, id: FamilyId, name: &str) -> ActionResult<Family> {
        let input = FamilyInput { name: name.to_string() }.validate()?;
        let family = self
            .store
            .update_family(id, &input)
            .await
            .map_err(failed(EntityKind::Family.update_failed()))?
            .ok_or_else(|| ActionError::NotFound(EntityKind::Family.not_found()))?;
        info!(family_id = %id, "family renamed");
        self.revalidator.notify(EntityKind::Family.admin_path());
        Ok(family)
    }

    #[instrument(skip(self))]
    pub async fn delete_family(&self, id: FamilyId) -> ActionResult<()> {
        let delete_failed = EntityKind::Family.delete_failed();
        if self
            .store
            .family_has_categories(id)
            .await
            .map_err(failed(delete_failed.clone()))?
        {
            return Err(DeleteBlocker::FamilyHasCategories.into());
        }
        if !self.store.delete_family(id).await.map_err(failed(delete_failed))? {
            return Err(ActionError::NotFound(EntityKind::Family.not_found()));
        }
        info!(family_id = %id, "family deleted");
        self.revalidator.notify(EntityKind::Family.admin_path());
        Ok(())
    }

    #[instrument(skip(self, input))]
    pub async fn create_category(&self, input: &CategoryInput) -> ActionResult<Category> {
        let input = input.validate()?;
        let category = self
            .store
            .insert_category(&input)
            .await
            .map_err(failed(EntityKind::Category.create_failed()))?;
        info!(category_id = %category.id, family_id = %category.family_id, "category created");
        self.revalidator.notify(EntityKind::Category.admin_path());
        Ok(category)
    }

    /// Rename only; the family is taken from the stored row.
    #[instrument(skip(self))]
    pub async fn update_category(&self, id: CategoryId, name: &str) -> ActionResult<Category> {
        let update_failed = EntityKind::Category.update_failed();
        let current = self
            .store
            .get_category(id)
            .await
            .map_err(failed(update_failed.clone()))?
            .ok_or_else(|| ActionError::NotFound(EntityKind::Category.not_found()))?;
        let input = CategoryInput { name: name.to_string(), family_id: current.family_id }.validate()?;
        let category = self
            .store
            .update_category(id, &input)
            .await
            .map_err(failed(update_failed))?
            .ok_or_else(|| ActionError::NotFound(EntityKind::Category.not_found()))?;
        info!(category_id = %id, "category renamed");
        self.revalidator.notify(EntityKind::Category.admin_path());
        Ok(category)
    }

    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> ActionResult<()> {
        let delete_failed = EntityKind::Category.delete_failed();
        if self
            .store
            .category_has_subcategories(id)
            .await
            .map_err(failed(delete_failed.clone()))?
        {
            return Err(DeleteBlocker::CategoryHasSubcategories.into());
        }
        if !self.store.delete_category(id).await.map_err(failed(delete_failed))? {
            return Err(ActionError::NotFound(EntityKind::Category.not_found()));
        }
        info!(category_id = %id, "category deleted");
        self.revalidator.notify(EntityKind::Category.admin_path());
        Ok(())
    }

    #[instrument(skip(self, input))]
    pub async fn create_subcategory(&self, input: &SubcategoryInput) -> ActionResult<Subcategory> {
        let input = input.validate()?;
        let subcategory = self
            .store
            .insert_subcategory(&input)
            .await
            .map_err(failed(EntityKind::Subcategory.create_failed()))?;
        info!(subcategory_id = %subcategory.id, category_id = %subcategory.category_id, "subcategory created");
        self.revalidator.notify(EntityKind::Subcategory.admin_path());
        Ok(subcategory)
    }

    /// Rename only; the category is taken from the stored row.
    #[instrument(skip(self))]
    pub async fn update_subcategory(&self, id: SubcategoryId, name: &str) -> ActionResult<Subcategory> {
        let update_failed = EntityKind::Subcategory.update_failed();
        let current = self
            .store
            .get_subcategory(id)
            .await
            .map_err(failed(update_failed.clone()))?
            .ok_or_else(|| ActionError::NotFound(EntityKind::Subcategory.not_found()))?;
        let input =
            SubcategoryInput { name: name.to_string(), category_id: current.category_id }.validate()?;
        let subcategory = self
            .store
            .update_subcategory(id, &input)
            .await
            .map_err(failed(update_failed))?
            .ok_or_else(|| ActionError::NotFound(EntityKind::Subcategory.not_found()))?;
        info!(subcategory_id = %id, "subcategory renamed");
        self.revalidator.notify(EntityKind::Subcategory.admin_path());
        Ok(subcategory)
    }

    #[instrument(skip(self))]
    pub async fn delete_subcategory(&self, id: SubcategoryId) -> ActionResult<()> {
        let delete_failed = EntityKind::Subcategory.delete_failed();
        if self
            .store
            .subcategory_has_products(id)
            .await
            .map_err(failed(delete_failed.clone()))?
        {
            return Err(DeleteBlocker::SubcategoryHasProducts.into());
        }
        if !self.store.delete_subcategory(id).await.map_err(failed(delete_failed))? {
            return Err(ActionError::NotFound(EntityKind::Subcategory.not_found()));
        }
        info!(subcategory_id = %id, "subcategory deleted");
        self.revalidator.notify(EntityKind::Subcategory.admin_path());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use vitrina_catalog::NewProduct;

    use super::*;
    use crate::actions::test_support::{actions, subcategory};
    use crate::store::CatalogStore;

    #[tokio::test]
    async fn validation_runs_before_the_store() {
        let (actions, store) = actions();
        store.fail_on("insert_family", 0);
        let err = actions.create_family(&FamilyInput { name: " x ".into() }).await.unwrap_err();
        assert!(matches!(err, ActionError::Validation(_)));
        // The injected fault is still armed: the store was never called.
        let err = actions.create_family(&FamilyInput { name: "Ropa".into() }).await.unwrap_err();
        assert_eq!(err, ActionError::Failed("Error al crear la familia".into()));
    }

    #[tokio::test]
    async fn family_with_categories_cannot_be_deleted() {
        let (actions, store) = actions();
        subcategory(&store, "Ropa", "Camisetas", "Manga corta").await;
        let family = store.list_families().await.unwrap().remove(0);

        let err = actions.delete_family(family.id).await.unwrap_err();
        assert_eq!(err, ActionError::Blocked(DeleteBlocker::FamilyHasCategories));
        assert!(store.get_family(family.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn empty_nodes_delete_bottom_up() {
        let (actions, store) = actions();
        let sub_id = subcategory(&store, "Ropa", "Camisetas", "Manga corta").await;
        let sub = store.get_subcategory(sub_id).await.unwrap().unwrap();
        let category = store.get_category(sub.category_id).await.unwrap().unwrap();

        actions.delete_subcategory(sub_id).await.unwrap();
        actions.delete_category(category.id).await.unwrap();
        actions.delete_family(category.family_id).await.unwrap();
        assert!(actions.families_with_relations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn subcategory_with_products_is_blocked() {
        let (actions, store) = actions();
        let sub_id = subcategory(&store, "Ropa", "Camisetas", "Manga corta").await;
        store
            .insert_product(&NewProduct {
                name: "Camiseta".into(),
                sku: "CAM-1".into(),
                price: 1000,
                detail: None,
                image_path: None,
                subcategory_id: sub_id,
            })
            .await
            .unwrap();
        let err = actions.delete_subcategory(sub_id).await.unwrap_err();
        assert_eq!(err.message(), "No se puede eliminar una subcategoría con productos");
    }

    #[tokio::test]
    async fn rename_keeps_parent() {
        let (actions, store) = actions();
        let sub_id = subcategory(&store, "Ropa", "Camisetas", "Manga corta").await;
        let before = store.get_subcategory(sub_id).await.unwrap().unwrap();

        let renamed = actions.update_subcategory(sub_id, "  Manga larga ").await.unwrap();
        assert_eq!(renamed.name, "Manga larga");
        assert_eq!(renamed.category_id, before.category_id);

        let category = actions.update_category(before.category_id, "Polos").await.unwrap();
        let family_id = store.list_families().await.unwrap()[0].id;
        assert_eq!(category.family_id, family_id);
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let (actions, _) = actions();
        assert_eq!(
            actions.update_category(CategoryId::new(77), "Polos").await.unwrap_err(),
            ActionError::NotFound("Categoría no encontrada".into())
        );
        assert_eq!(
            actions.update_family(FamilyId::new(77), "Hogar").await.unwrap_err(),
            ActionError::NotFound("Familia no encontrada".into())
        );
    }

    #[tokio::test]
    async fn mutations_publish_revalidation_notices() {
        let (actions, _) = actions();
        let mut rx = actions.revalidator().subscribe();
        actions.create_family(&FamilyInput { name: "Hogar".into() }).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().path, "/admin/dashboard/families");
    }

    #[tokio::test]
    async fn tree_load_failure_is_generic() {
        let (actions, store) = actions();
        store.fail_on("list_categories", 0);
        assert_eq!(
            actions.families_with_relations().await.unwrap_err(),
            ActionError::Failed("Error al cargar las familias".into())
        );
    }
}
