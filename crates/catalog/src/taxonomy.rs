//! Family → Category → Subcategory taxonomy.

use serde::{Deserialize, Serialize};

use vitrina_core::{CategoryId, Entity, FamilyId, SubcategoryId};

use crate::filter::TaxonomyScope;

/// Top level of the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    pub id: FamilyId,
    pub name: String,
}

/// Second level; always owned by a family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub family_id: FamilyId,
}

/// Leaf level; products hang from subcategories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub name: String,
    pub category_id: CategoryId,
}

impl Entity for Family {
    type Id = FamilyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Entity for Subcategory {
    type Id = SubcategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyNode {
    #[serde(flatten)]
    pub family: Family,
    pub categories: Vec<CategoryNode>,
}

/// Assemble the admin/storefront tree from flat rows.
///
/// Every level is ordered by name. Categories or subcategories whose parent
/// is missing from the input are dropped.
pub fn build_tree(
    mut families: Vec<Family>,
    mut categories: Vec<Category>,
    mut subcategories: Vec<Subcategory>,
) -> Vec<FamilyNode> {
    families.sort_by(|a, b| a.name.cmp(&b.name));
    categories.sort_by(|a, b| a.name.cmp(&b.name));
    subcategories.sort_by(|a, b| a.name.cmp(&b.name));

    families
        .into_iter()
        .map(|family| {
            let categories = categories
                .iter()
                .filter(|c| c.family_id == family.id)
                .map(|category| CategoryNode {
                    category: category.clone(),
                    subcategories: subcategories
                        .iter()
                        .filter(|s| s.category_id == category.id)
                        .cloned()
                        .collect(),
                })
                .collect();
            FamilyNode { family, categories }
        })
        .collect()
}

/// A subcategory with its ancestors, used for breadcrumbs and listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomyChain {
    pub subcategory: Subcategory,
    pub category: Option<Category>,
    pub family: Option<Family>,
}

impl TaxonomyChain {
    pub fn family_id(&self) -> Option<FamilyId> {
        self.family
            .as_ref()
            .map(|f| f.id)
            .or_else(|| self.category.as_ref().map(|c| c.family_id))
    }

    pub fn category_id(&self) -> CategoryId {
        self.subcategory.category_id
    }
}

/// Names resolved for the most specific taxonomy node a visitor selected.
///
/// Selecting a subcategory fills all three levels; selecting a category fills
/// category and family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyPath {
    pub family_name: Option<String>,
    pub category_name: Option<String>,
    pub subcategory_name: Option<String>,
}

impl TaxonomyPath {
    /// Name of the most specific node in the path.
    pub fn most_specific(&self) -> Option<&str> {
        self.subcategory_name
            .as_deref()
            .or(self.category_name.as_deref())
            .or(self.family_name.as_deref())
    }
}

/// Look up the names for a scope in an already-built tree. Unknown ids
/// resolve to an empty path.
pub fn resolve_path(tree: &[FamilyNode], scope: TaxonomyScope) -> TaxonomyPath {
    match scope {
        TaxonomyScope::All => TaxonomyPath::default(),
        TaxonomyScope::Family(id) => tree
            .iter()
            .find(|f| f.family.id == id)
            .map(|f| TaxonomyPath {
                family_name: Some(f.family.name.clone()),
                ..TaxonomyPath::default()
            })
            .unwrap_or_default(),
        TaxonomyScope::Category(id) => {
            for family in tree {
                if let Some(node) = family.categories.iter().find(|c| c.category.id == id) {
                    return TaxonomyPath {
                        family_name: Some(family.family.name.clone()),
                        category_name: Some(node.category.name.clone()),
                        subcategory_name: None,
                    };
                }
            }
            TaxonomyPath::default()
        }
        TaxonomyScope::Subcategory(id) => {
            for family in tree {
                for node in &family.categories {
                    if let Some(sub) = node.subcategories.iter().find(|s| s.id == id) {
                        return TaxonomyPath {
                            family_name: Some(family.family.name.clone()),
                            category_name: Some(node.category.name.clone()),
                            subcategory_name: Some(sub.name.clone()),
                        };
                    }
                }
            }
            TaxonomyPath::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Vec<FamilyNode> {
        let families = vec![
            Family { id: FamilyId::new(2), name: "Ropa".into() },
            Family { id: FamilyId::new(1), name: "Hogar".into() },
        ];
        let categories = vec![
            Category { id: CategoryId::new(10), name: "Camisetas".into(), family_id: FamilyId::new(2) },
            Category { id: CategoryId::new(11), name: "Abrigos".into(), family_id: FamilyId::new(2) },
            Category { id: CategoryId::new(12), name: "Cocina".into(), family_id: FamilyId::new(1) },
            Category { id: CategoryId::new(13), name: "Huérfana".into(), family_id: FamilyId::new(99) },
        ];
        let subcategories = vec![
            Subcategory { id: SubcategoryId::new(100), name: "Manga corta".into(), category_id: CategoryId::new(10) },
            Subcategory { id: SubcategoryId::new(101), name: "Manga larga".into(), category_id: CategoryId::new(10) },
        ];
        build_tree(families, categories, subcategories)
    }

    #[test]
    fn tree_is_grouped_and_ordered_by_name() {
        let tree = fixture();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].family.name, "Hogar");
        assert_eq!(tree[1].family.name, "Ropa");
        let ropa: Vec<_> = tree[1].categories.iter().map(|c| c.category.name.as_str()).collect();
        assert_eq!(ropa, vec!["Abrigos", "Camisetas"]);
        assert_eq!(tree[1].categories[1].subcategories.len(), 2);
        assert!(tree.iter().all(|f| f.categories.iter().all(|c| c.category.name != "Huérfana")));
    }

    #[test]
    fn resolve_path_fills_ancestors() {
        let tree = fixture();
        let path = resolve_path(&tree, TaxonomyScope::Subcategory(SubcategoryId::new(101)));
        assert_eq!(path.subcategory_name.as_deref(), Some("Manga larga"));
        assert_eq!(path.category_name.as_deref(), Some("Camisetas"));
        assert_eq!(path.family_name.as_deref(), Some("Ropa"));
        assert_eq!(path.most_specific(), Some("Manga larga"));

        let path = resolve_path(&tree, TaxonomyScope::Category(CategoryId::new(12)));
        assert_eq!(path.family_name.as_deref(), Some("Hogar"));
        assert_eq!(path.subcategory_name, None);

        let path = resolve_path(&tree, TaxonomyScope::Family(FamilyId::new(404)));
        assert_eq!(path, TaxonomyPath::default());
    }
}
