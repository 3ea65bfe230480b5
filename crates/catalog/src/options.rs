//! Global options (axes of variation) and their features.

use serde::{Deserialize, Serialize};

use vitrina_core::{Entity, FeatureId, OptionId};

/// A catalog-wide axis of variation such as "Color" or "Talla".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    pub id: OptionId,
    pub name: String,
}

/// A concrete value of an option ("Rojo", "XL").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub value: String,
    pub option_id: OptionId,
}

impl Entity for ProductOption {
    type Id = OptionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Entity for Feature {
    type Id = FeatureId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionWithFeatures {
    #[serde(flatten)]
    pub option: ProductOption,
    pub features: Vec<Feature>,
}

impl OptionWithFeatures {
    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }
}

/// Attach each feature to its option, preserving the input order of both.
pub fn attach_features(options: Vec<ProductOption>, features: &[Feature]) -> Vec<OptionWithFeatures> {
    options
        .into_iter()
        .map(|option| {
            let features = features
                .iter()
                .filter(|f| f.option_id == option.id)
                .cloned()
                .collect();
            OptionWithFeatures { option, features }
        })
        .collect()
}

/// Keep the options named in `selected`, in selection order. Ids that do not
/// name a known option are skipped.
pub fn select_in_order(all: &[OptionWithFeatures], selected: &[OptionId]) -> Vec<OptionWithFeatures> {
    selected
        .iter()
        .filter_map(|id| all.iter().find(|o| o.option.id == *id).cloned())
        .collect()
}
