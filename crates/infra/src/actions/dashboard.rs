//! Admin dashboard figures. These never fail: a store error is logged and
//! the figure falls back to zeros or an empty list.

use serde::Serialize;
use tracing::warn;

use vitrina_catalog::stats::DEFAULT_TOP_PRODUCTS;
use vitrina_catalog::{
    CatalogSnapshot, Category, CategoryStats, DashboardStats, Family, FamilyStats, Product, Subcategory,
    TopProduct, Variant,
};

use super::CatalogActions;
use crate::store::StoreResult;

/// Owned copy of every row the dashboard reads.
#[derive(Debug, Default)]
struct SnapshotRows {
    families: Vec<Family>,
    categories: Vec<Category>,
    subcategories: Vec<Subcategory>,
    products: Vec<Product>,
    variants: Vec<Variant>,
}

impl SnapshotRows {
    fn snapshot(&self) -> CatalogSnapshot<'_> {
        CatalogSnapshot {
            families: &self.families,
            categories: &self.categories,
            subcategories: &self.subcategories,
            products: &self.products,
            variants: &self.variants,
        }
    }
}

/// The four dashboard panels in one payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardOverview {
    pub stats: DashboardStats,
    pub top_products: Vec<TopProduct>,
    pub categories: Vec<CategoryStats>,
    pub families: Vec<FamilyStats>,
}

impl CatalogActions {
    async fn snapshot_rows(&self) -> StoreResult<SnapshotRows> {
        let (families, categories, subcategories, products, variants) = tokio::join!(
            self.store.list_families(),
            self.store.list_categories(),
            self.store.list_subcategories(),
            self.store.list_products(),
            self.store.list_all_variants(),
        );
        Ok(SnapshotRows {
            families: families?,
            categories: categories?,
            subcategories: subcategories?,
            products: products?,
            variants: variants?,
        })
    }

    async fn snapshot_or_empty(&self, panel: &'static str) -> SnapshotRows {
        self.snapshot_rows().await.unwrap_or_else(|err| {
            warn!(error = %err, panel, "dashboard panel degraded");
            SnapshotRows::default()
        })
    }

    pub async fn dashboard_stats(&self) -> DashboardStats {
        self.snapshot_or_empty("stats").await.snapshot().dashboard_stats()
    }

    pub async fn top_products_by_stock(&self, limit: Option<usize>) -> Vec<TopProduct> {
        self.snapshot_or_empty("top_products")
            .await
            .snapshot()
            .top_products_by_stock(limit.unwrap_or(DEFAULT_TOP_PRODUCTS))
    }

    pub async fn category_stats(&self) -> Vec<CategoryStats> {
        self.snapshot_or_empty("categories").await.snapshot().category_stats()
    }

    pub async fn family_stats(&self) -> Vec<FamilyStats> {
        self.snapshot_or_empty("families").await.snapshot().family_stats()
    }

    /// All panels from a single read of the catalog.
    pub async fn dashboard_overview(&self) -> DashboardOverview {
        let rows = self.snapshot_or_empty("overview").await;
        let snapshot = rows.snapshot();
        DashboardOverview {
            stats: snapshot.dashboard_stats(),
            top_products: snapshot.top_products_by_stock(DEFAULT_TOP_PRODUCTS),
            categories: snapshot.category_stats(),
            families: snapshot.family_stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use vitrina_catalog::{DashboardStats, NewProduct, NewVariant};

    use crate::actions::test_support::{actions, subcategory};
    use crate::store::CatalogStore;

    #[tokio::test]
    async fn overview_reads_the_catalog() {
        let (actions, store) = actions();
        let sub = subcategory(&store, "Ropa", "Camisetas", "Manga corta").await;
        let product = store
            .insert_product(&NewProduct {
                name: "Camiseta".into(),
                sku: "CAM".into(),
                price: 1000,
                detail: None,
                image_path: None,
                subcategory_id: sub,
            })
            .await
            .unwrap();
        for stock in [4, 0, 20] {
            store
                .insert_variant(&NewVariant { product_id: product.id, price: 1000, stock })
                .await
                .unwrap();
        }

        let overview = actions.dashboard_overview().await;
        assert_eq!(overview.stats.total_products, 1);
        assert_eq!(overview.stats.total_stock, 24);
        assert_eq!(overview.stats.total_inventory_value, 24_000);
        assert_eq!(overview.stats.low_stock_count, 1);
        assert_eq!(overview.stats.out_of_stock_count, 1);
        assert_eq!(overview.top_products[0].total_stock, 24);
        assert_eq!(overview.families[0].total_value, 24_000);
        assert_eq!(actions.top_products_by_stock(Some(0)).await.len(), 0);
    }

    #[tokio::test]
    async fn store_failure_degrades_to_zeros() {
        let (actions, store) = actions();
        subcategory(&store, "Ropa", "Camisetas", "Manga corta").await;
        store.fail_on("list_all_variants", 0);
        let stats = actions.dashboard_stats().await;
        assert_eq!(stats, DashboardStats::default());
        assert_eq!(actions.category_stats().await.len(), 1);
    }
}
