//! Global options and their feature values.

use tracing::{info, instrument};

use vitrina_catalog::options::attach_features;
use vitrina_catalog::{
    DeleteBlocker, EntityKind, Feature, FeatureInput, OptionInput, OptionWithFeatures, ProductOption,
};
use vitrina_core::{FeatureId, OptionId};

use super::{failed, ActionError, ActionResult, CatalogActions};

impl CatalogActions {
    /// Options by name, each with its features by value.
    pub async fn options_with_features(&self) -> ActionResult<Vec<OptionWithFeatures>> {
        let list_failed = EntityKind::Option.list_failed();
        let (options, features) = tokio::join!(self.store.list_options(), self.store.list_features());
        let options = options.map_err(failed(list_failed.clone()))?;
        let features = features.map_err(failed(list_failed))?;
        Ok(attach_features(options, &features))
    }

    #[instrument(skip(self, input))]
    pub async fn create_option(&self, input: &OptionInput) -> ActionResult<ProductOption> {
        let input = input.validate()?;
        let option = self
            .store
            .insert_option(&input)
            .await
            .map_err(failed(EntityKind::Option.create_failed()))?;
        info!(option_id = %option.id, "option created");
        self.revalidator.notify(EntityKind::Option.admin_path());
        Ok(option)
    }

    #[instrument(skip(self))]
    pub async fn update_option(&self, id: OptionId, name: &str) -> ActionResult<ProductOption> {
        let input = OptionInput { name: name.to_string() }.validate()?;
        let option = self
            .store
            .update_option(id, &input)
            .await
            .map_err(failed(EntityKind::Option.update_failed()))?
            .ok_or_else(|| ActionError::NotFound(EntityKind::Option.not_found()))?;
        info!(option_id = %id, "option renamed");
        self.revalidator.notify(EntityKind::Option.admin_path());
        Ok(option)
    }

    #[instrument(skip(self))]
    pub async fn delete_option(&self, id: OptionId) -> ActionResult<()> {
        let delete_failed = EntityKind::Option.delete_failed();
        if self
            .store
            .option_has_features(id)
            .await
            .map_err(failed(delete_failed.clone()))?
        {
            return Err(DeleteBlocker::OptionHasFeatures.into());
        }
        if self.store.option_in_use(id).await.map_err(failed(delete_failed.clone()))? {
            return Err(DeleteBlocker::OptionInUse.into());
        }
        if !self.store.delete_option(id).await.map_err(failed(delete_failed))? {
            return Err(ActionError::NotFound(EntityKind::Option.not_found()));
        }
        info!(option_id = %id, "option deleted");
        self.revalidator.notify(EntityKind::Option.admin_path());
        Ok(())
    }

    #[instrument(skip(self, input))]
    pub async fn create_feature(&self, input: &FeatureInput) -> ActionResult<Feature> {
        let input = input.validate()?;
        let feature = self
            .store
            .insert_feature(&input)
            .await
            .map_err(failed(EntityKind::Feature.create_failed()))?;
        info!(feature_id = %feature.id, option_id = %feature.option_id, "feature created");
        self.revalidator.notify(EntityKind::Feature.admin_path());
        Ok(feature)
    }

    /// Change the value only; the option is taken from the stored row.
    #[instrument(skip(self))]
    pub async fn update_feature(&self, id: FeatureId, value: &str) -> ActionResult<Feature> {
        let update_failed = EntityKind::Feature.update_failed();
        let current = self
            .store
            .get_feature(id)
            .await
            .map_err(failed(update_failed.clone()))?
            .ok_or_else(|| ActionError::NotFound(EntityKind::Feature.not_found()))?;
        let input = FeatureInput { value: value.to_string(), option_id: current.option_id }.validate()?;
        let feature = self
            .store
            .update_feature(id, &input)
            .await
            .map_err(failed(update_failed))?
            .ok_or_else(|| ActionError::NotFound(EntityKind::Feature.not_found()))?;
        info!(feature_id = %id, "feature updated");
        self.revalidator.notify(EntityKind::Feature.admin_path());
        Ok(feature)
    }

    #[instrument(skip(self))]
    pub async fn delete_feature(&self, id: FeatureId) -> ActionResult<()> {
        let delete_failed = EntityKind::Feature.delete_failed();
        if self
            .store
            .feature_in_use(id)
            .await
            .map_err(failed(delete_failed.clone()))?
        {
            return Err(DeleteBlocker::FeatureInUse.into());
        }
        if !self.store.delete_feature(id).await.map_err(failed(delete_failed))? {
            return Err(ActionError::NotFound(EntityKind::Feature.not_found()));
        }
        info!(feature_id = %id, "feature deleted");
        self.revalidator.notify(EntityKind::Feature.admin_path());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use vitrina_catalog::NewVariant;
    use vitrina_core::ProductId;

    use super::*;
    use crate::actions::test_support::{actions, option};
    use crate::store::CatalogStore;

    #[tokio::test]
    async fn options_and_features_are_sorted() {
        let (actions, store) = actions();
        option(&store, "Talla", &["M", "L", "S"]).await;
        option(&store, "Color", &["Rojo", "Azul"]).await;

        let options = actions.options_with_features().await.unwrap();
        let names: Vec<_> = options.iter().map(|o| o.option.name.as_str()).collect();
        assert_eq!(names, vec!["Color", "Talla"]);
        let sizes: Vec<_> = options[1].features.iter().map(|f| f.value.as_str()).collect();
        assert_eq!(sizes, vec!["L", "M", "S"]);
    }

    #[tokio::test]
    async fn option_with_features_is_blocked() {
        let (actions, store) = actions();
        let (option_id, _) = option(&store, "Talla", &["M"]).await;
        assert_eq!(
            actions.delete_option(option_id).await.unwrap_err(),
            ActionError::Blocked(DeleteBlocker::OptionHasFeatures)
        );
    }

    #[tokio::test]
    async fn feature_in_use_is_blocked_until_unlinked() {
        let (actions, store) = actions();
        let (_, features) = option(&store, "Talla", &["M"]).await;
        let variant = store
            .insert_variant(&NewVariant { product_id: ProductId::new(1), price: 100, stock: 1 })
            .await
            .unwrap();
        store.insert_variant_feature(variant.id, features[0]).await.unwrap();

        assert_eq!(
            actions.delete_feature(features[0]).await.unwrap_err(),
            ActionError::Blocked(DeleteBlocker::FeatureInUse)
        );
        store.delete_variant_features(&[variant.id]).await.unwrap();
        actions.delete_feature(features[0]).await.unwrap();
    }

    #[tokio::test]
    async fn feature_update_keeps_option() {
        let (actions, store) = actions();
        let (option_id, features) = option(&store, "Color", &["Rojo"]).await;
        let updated = actions.update_feature(features[0], "Granate").await.unwrap();
        assert_eq!(updated.value, "Granate");
        assert_eq!(updated.option_id, option_id);
    }
}
