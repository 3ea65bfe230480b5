//! Postgres-backed catalog store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | Database (any code) | `Backend` with the database message |
//! | RowNotFound | `NotFound` |
//! | ColumnDecode / Decode | `Decode` |
//! | PoolClosed, Io, Tls, other | `Backend` |
//!
//! Every method is a single statement against the pool. Multi-row writes
//! (product creation, cascading deletes) are sequenced by the caller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;

use vitrina_auth::{Profile, ProfileUpdate};
use vitrina_catalog::{
    Category, CategoryInput, Family, FamilyInput, Feature, FeatureInput, NewProduct, NewVariant,
    OptionInput, Page, Product, ProductFilter, ProductOption, Subcategory, SubcategoryInput,
    TaxonomyScope, Variant, VariantFeature,
};
use vitrina_core::{
    CategoryId, FamilyId, FeatureId, OptionId, ProductId, SubcategoryId, UserId, VariantId,
};

use super::{CatalogStore, ProfileStore, StoreError, StoreResult};

const SCHEMA: &str = include_str!("../../migrations/0001_catalog.sql");

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.sku, p.price, p.detail, p.image_path, p.subcategory_id";

/// Joined listing query. Inner joins drop products whose ancestor chain is
/// broken.
const PRODUCT_QUERY_FROM: &str = r#"
    FROM products p
    JOIN subcategories s ON s.id = p.subcategory_id
    JOIN categories c ON c.id = s.category_id
    JOIN families f ON f.id = c.family_id
    WHERE ($1::BIGINT IS NULL OR s.id = $1)
      AND ($2::BIGINT IS NULL OR c.id = $2)
      AND ($3::BIGINT IS NULL OR f.id = $3)
      AND ($4::BIGINT IS NULL OR p.price >= $4)
      AND ($5::BIGINT IS NULL OR p.price <= $5)
"#;

#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Open a small pool against `database_url`.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the catalog tables if they do not exist.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn exists(&self, operation: &'static str, sql: &'static str, id: i64) -> StoreResult<bool> {
        let row = sqlx::query(sql)
            .bind(id)
            .fetch_one(self.pool())
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        row.try_get::<bool, _>(0).map_err(|e| map_sqlx_error(operation, e))
    }

    async fn execute(
        &self,
        operation: &'static str,
        query: sqlx::query::Query<'_, sqlx::Postgres, PgArguments>,
    ) -> StoreResult<u64> {
        query
            .execute(self.pool())
            .await
            .map(|done| done.rows_affected())
            .map_err(|e| map_sqlx_error(operation, e))
    }
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::backend(operation, db_err.message()),
        sqlx::Error::RowNotFound => StoreError::NotFound(operation),
        sqlx::Error::ColumnDecode { index, source } => {
            StoreError::decode(operation, format!("column {index}: {source}"))
        }
        sqlx::Error::Decode(source) => StoreError::decode(operation, source.to_string()),
        other => StoreError::backend(operation, other.to_string()),
    }
}

fn decode_rows<T>(
    operation: &'static str,
    rows: Vec<PgRow>,
    decode: fn(&PgRow) -> Result<T, sqlx::Error>,
) -> StoreResult<Vec<T>> {
    rows.iter()
        .map(|row| decode(row).map_err(|e| map_sqlx_error(operation, e)))
        .collect()
}

fn decode_opt<T>(
    operation: &'static str,
    row: Option<PgRow>,
    decode: fn(&PgRow) -> Result<T, sqlx::Error>,
) -> StoreResult<Option<T>> {
    row.as_ref()
        .map(decode)
        .transpose()
        .map_err(|e| map_sqlx_error(operation, e))
}

/// Cents as stored; the column check keeps them non-negative.
fn cents(value: i64) -> u64 {
    value.max(0) as u64
}

fn to_db_cents(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn family_row(row: &PgRow) -> Result<Family, sqlx::Error> {
    Ok(Family { id: FamilyId::new(row.try_get("id")?), name: row.try_get("name")? })
}

fn category_row(row: &PgRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: CategoryId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        family_id: FamilyId::new(row.try_get("family_id")?),
    })
}

fn subcategory_row(row: &PgRow) -> Result<Subcategory, sqlx::Error> {
    Ok(Subcategory {
        id: SubcategoryId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        category_id: CategoryId::new(row.try_get("category_id")?),
    })
}

fn option_row(row: &PgRow) -> Result<ProductOption, sqlx::Error> {
    Ok(ProductOption { id: OptionId::new(row.try_get("id")?), name: row.try_get("name")? })
}

fn feature_row(row: &PgRow) -> Result<Feature, sqlx::Error> {
    Ok(Feature {
        id: FeatureId::new(row.try_get("id")?),
        value: row.try_get("value")?,
        option_id: OptionId::new(row.try_get("option_id")?),
    })
}

fn product_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: ProductId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        sku: row.try_get("sku")?,
        price: cents(row.try_get("price")?),
        detail: row.try_get("detail")?,
        image_path: row.try_get("image_path")?,
        subcategory_id: SubcategoryId::new(row.try_get("subcategory_id")?),
    })
}

fn variant_row(row: &PgRow) -> Result<Variant, sqlx::Error> {
    Ok(Variant {
        id: VariantId::new(row.try_get("id")?),
        product_id: ProductId::new(row.try_get("product_id")?),
        price: row.try_get::<Option<i64>, _>("price")?.map(cents),
        stock: row.try_get("stock")?,
    })
}

fn variant_feature_row(row: &PgRow) -> Result<VariantFeature, sqlx::Error> {
    Ok(VariantFeature {
        variant_id: VariantId::new(row.try_get("variant_id")?),
        feature_id: FeatureId::new(row.try_get("feature_id")?),
    })
}

fn profile_row(row: &PgRow) -> Result<Profile, sqlx::Error> {
    Ok(Profile {
        id: UserId::from_uuid(row.try_get("id")?),
        full_name: row.try_get("full_name")?,
        avatar_url: row.try_get("avatar_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// `($1, $2, $3)` bind values for [`PRODUCT_QUERY_FROM`].
fn scope_binds(scope: TaxonomyScope) -> (Option<i64>, Option<i64>, Option<i64>) {
    match scope {
        TaxonomyScope::All => (None, None, None),
        TaxonomyScope::Subcategory(id) => (Some(id.get()), None, None),
        TaxonomyScope::Category(id) => (None, Some(id.get()), None),
        TaxonomyScope::Family(id) => (None, None, Some(id.get())),
    }
}

#[async_trait::async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip(self), err)]
    async fn list_families(&self) -> StoreResult<Vec<Family>> {
        let rows = sqlx::query("SELECT id, name FROM families ORDER BY name, id")
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_sqlx_error("list_families", e))?;
        decode_rows("list_families", rows, family_row)
    }

    async fn get_family(&self, id: FamilyId) -> StoreResult<Option<Family>> {
        let row = sqlx::query("SELECT id, name FROM families WHERE id = $1")
            .bind(id.get())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("get_family", e))?;
        decode_opt("get_family", row, family_row)
    }

    #[instrument(skip(self), err)]
    async fn insert_family(&self, input: &FamilyInput) -> StoreResult<Family> {
        let row = sqlx::query("INSERT INTO families (name) VALUES ($1) RETURNING id, name")
            .bind(&input.name)
            .fetch_one(self.pool())
            .await
            .map_err(|e| map_sqlx_error("insert_family", e))?;
        family_row(&row).map_err(|e| map_sqlx_error("insert_family", e))
    }

    #[instrument(skip(self), err)]
    async fn update_family(&self, id: FamilyId, input: &FamilyInput) -> StoreResult<Option<Family>> {
        let row = sqlx::query("UPDATE families SET name = $2 WHERE id = $1 RETURNING id, name")
            .bind(id.get())
            .bind(&input.name)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("update_family", e))?;
        decode_opt("update_family", row, family_row)
    }

    #[instrument(skip(self), err)]
    async fn delete_family(&self, id: FamilyId) -> StoreResult<bool> {
        let q = sqlx::query("DELETE FROM families WHERE id = $1").bind(id.get());
        Ok(self.execute("delete_family", q).await? > 0)
    }

    async fn family_has_categories(&self, id: FamilyId) -> StoreResult<bool> {
        self.exists(
            "family_has_categories",
            "SELECT EXISTS (SELECT 1 FROM categories WHERE family_id = $1)",
            id.get(),
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, family_id FROM categories ORDER BY name, id")
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_sqlx_error("list_categories", e))?;
        decode_rows("list_categories", rows, category_row)
    }

    async fn get_category(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        let row = sqlx::query("SELECT id, name, family_id FROM categories WHERE id = $1")
            .bind(id.get())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("get_category", e))?;
        decode_opt("get_category", row, category_row)
    }

    #[instrument(skip(self), err)]
    async fn insert_category(&self, input: &CategoryInput) -> StoreResult<Category> {
        let row = sqlx::query(
            "INSERT INTO categories (name, family_id) VALUES ($1, $2) RETURNING id, name, family_id",
        )
        .bind(&input.name)
        .bind(input.family_id.get())
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_sqlx_error("insert_category", e))?;
        category_row(&row).map_err(|e| map_sqlx_error("insert_category", e))
    }

    #[instrument(skip(self), err)]
    async fn update_category(&self, id: CategoryId, input: &CategoryInput) -> StoreResult<Option<Category>> {
        let row = sqlx::query(
            r#"
            UPDATE categories SET name = $2, family_id = $3
            WHERE id = $1
            RETURNING id, name, family_id
            "#,
        )
        .bind(id.get())
        .bind(&input.name)
        .bind(input.family_id.get())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("update_category", e))?;
        decode_opt("update_category", row, category_row)
    }

    #[instrument(skip(self), err)]
    async fn delete_category(&self, id: CategoryId) -> StoreResult<bool> {
        let q = sqlx::query("DELETE FROM categories WHERE id = $1").bind(id.get());
        Ok(self.execute("delete_category", q).await? > 0)
    }

    async fn category_has_subcategories(&self, id: CategoryId) -> StoreResult<bool> {
        self.exists(
            "category_has_subcategories",
            "SELECT EXISTS (SELECT 1 FROM subcategories WHERE category_id = $1)",
            id.get(),
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn list_subcategories(&self) -> StoreResult<Vec<Subcategory>> {
        let rows = sqlx::query("SELECT id, name, category_id FROM subcategories ORDER BY name, id")
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_sqlx_error("list_subcategories", e))?;
        decode_rows("list_subcategories", rows, subcategory_row)
    }

    async fn get_subcategory(&self, id: SubcategoryId) -> StoreResult<Option<Subcategory>> {
        let row = sqlx::query("SELECT id, name, category_id FROM subcategories WHERE id = $1")
            .bind(id.get())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("get_subcategory", e))?;
        decode_opt("get_subcategory", row, subcategory_row)
    }

    #[instrument(skip(self), err)]
    async fn insert_subcategory(&self, input: &SubcategoryInput) -> StoreResult<Subcategory> {
        let row = sqlx::query(
            "INSERT INTO subcategories (name, category_id) VALUES ($1, $2) RETURNING id, name, category_id",
        )
        .bind(&input.name)
        .bind(input.category_id.get())
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_sqlx_error("insert_subcategory", e))?;
        subcategory_row(&row).map_err(|e| map_sqlx_error("insert_subcategory", e))
    }

    #[instrument(skip(self), err)]
    async fn update_subcategory(
        &self,
        id: SubcategoryId,
        input: &SubcategoryInput,
    ) -> StoreResult<Option<Subcategory>> {
        let row = sqlx::query(
            r#"
            UPDATE subcategories SET name = $2, category_id = $3
            WHERE id = $1
            RETURNING id, name, category_id
            "#,
        )
        .bind(id.get())
        .bind(&input.name)
        .bind(input.category_id.get())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("update_subcategory", e))?;
        decode_opt("update_subcategory", row, subcategory_row)
    }

    #[instrument(skip(self), err)]
    async fn delete_subcategory(&self, id: SubcategoryId) -> StoreResult<bool> {
        let q = sqlx::query("DELETE FROM subcategories WHERE id = $1").bind(id.get());
        Ok(self.execute("delete_subcategory", q).await? > 0)
    }

    async fn subcategory_has_products(&self, id: SubcategoryId) -> StoreResult<bool> {
        self.exists(
            "subcategory_has_products",
            "SELECT EXISTS (SELECT 1 FROM products WHERE subcategory_id = $1)",
            id.get(),
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn list_options(&self) -> StoreResult<Vec<ProductOption>> {
        let rows = sqlx::query("SELECT id, name FROM options ORDER BY name, id")
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_sqlx_error("list_options", e))?;
        decode_rows("list_options", rows, option_row)
    }

    async fn get_option(&self, id: OptionId) -> StoreResult<Option<ProductOption>> {
        let row = sqlx::query("SELECT id, name FROM options WHERE id = $1")
            .bind(id.get())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("get_option", e))?;
        decode_opt("get_option", row, option_row)
    }

    #[instrument(skip(self), err)]
    async fn insert_option(&self, input: &OptionInput) -> StoreResult<ProductOption> {
        let row = sqlx::query("INSERT INTO options (name) VALUES ($1) RETURNING id, name")
            .bind(&input.name)
            .fetch_one(self.pool())
            .await
            .map_err(|e| map_sqlx_error("insert_option", e))?;
        option_row(&row).map_err(|e| map_sqlx_error("insert_option", e))
    }

    #[instrument(skip(self), err)]
    async fn update_option(&self, id: OptionId, input: &OptionInput) -> StoreResult<Option<ProductOption>> {
        let row = sqlx::query("UPDATE options SET name = $2 WHERE id = $1 RETURNING id, name")
            .bind(id.get())
            .bind(&input.name)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("update_option", e))?;
        decode_opt("update_option", row, option_row)
    }

    #[instrument(skip(self), err)]
    async fn delete_option(&self, id: OptionId) -> StoreResult<bool> {
        let q = sqlx::query("DELETE FROM options WHERE id = $1").bind(id.get());
        Ok(self.execute("delete_option", q).await? > 0)
    }

    async fn option_has_features(&self, id: OptionId) -> StoreResult<bool> {
        self.exists(
            "option_has_features",
            "SELECT EXISTS (SELECT 1 FROM features WHERE option_id = $1)",
            id.get(),
        )
        .await
    }

    async fn option_in_use(&self, id: OptionId) -> StoreResult<bool> {
        self.exists(
            "option_in_use",
            "SELECT EXISTS (SELECT 1 FROM option_products WHERE option_id = $1)",
            id.get(),
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn list_features(&self) -> StoreResult<Vec<Feature>> {
        let rows = sqlx::query("SELECT id, value, option_id FROM features ORDER BY value, id")
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_sqlx_error("list_features", e))?;
        decode_rows("list_features", rows, feature_row)
    }

    async fn get_feature(&self, id: FeatureId) -> StoreResult<Option<Feature>> {
        let row = sqlx::query("SELECT id, value, option_id FROM features WHERE id = $1")
            .bind(id.get())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("get_feature", e))?;
        decode_opt("get_feature", row, feature_row)
    }

    #[instrument(skip(self), err)]
    async fn insert_feature(&self, input: &FeatureInput) -> StoreResult<Feature> {
        let row = sqlx::query(
            "INSERT INTO features (value, option_id) VALUES ($1, $2) RETURNING id, value, option_id",
        )
        .bind(&input.value)
        .bind(input.option_id.get())
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_sqlx_error("insert_feature", e))?;
        feature_row(&row).map_err(|e| map_sqlx_error("insert_feature", e))
    }

    #[instrument(skip(self), err)]
    async fn update_feature(&self, id: FeatureId, input: &FeatureInput) -> StoreResult<Option<Feature>> {
        let row = sqlx::query(
            r#"
            UPDATE features SET value = $2, option_id = $3
            WHERE id = $1
            RETURNING id, value, option_id
            "#,
        )
        .bind(id.get())
        .bind(&input.value)
        .bind(input.option_id.get())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("update_feature", e))?;
        decode_opt("update_feature", row, feature_row)
    }

    #[instrument(skip(self), err)]
    async fn delete_feature(&self, id: FeatureId) -> StoreResult<bool> {
        let q = sqlx::query("DELETE FROM features WHERE id = $1").bind(id.get());
        Ok(self.execute("delete_feature", q).await? > 0)
    }

    async fn feature_in_use(&self, id: FeatureId) -> StoreResult<bool> {
        self.exists(
            "feature_in_use",
            "SELECT EXISTS (SELECT 1 FROM variant_features WHERE feature_id = $1)",
            id.get(),
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products p ORDER BY p.name, p.id");
        let rows = sqlx::query(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;
        decode_rows("list_products", rows, product_row)
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?;
        decode_opt("get_product", row, product_row)
    }

    #[instrument(skip(self, product), fields(sku = %product.sku), err)]
    async fn insert_product(&self, product: &NewProduct) -> StoreResult<Product> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (name, sku, price, detail, image_path, subcategory_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, sku, price, detail, image_path, subcategory_id
            "#,
        )
        .bind(&product.name)
        .bind(&product.sku)
        .bind(to_db_cents(product.price))
        .bind(&product.detail)
        .bind(&product.image_path)
        .bind(product.subcategory_id.get())
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;
        product_row(&row).map_err(|e| map_sqlx_error("insert_product", e))
    }

    #[instrument(skip(self), err)]
    async fn delete_product(&self, id: ProductId) -> StoreResult<bool> {
        let q = sqlx::query("DELETE FROM products WHERE id = $1").bind(id.get());
        Ok(self.execute("delete_product", q).await? > 0)
    }

    #[instrument(skip(self), err)]
    async fn query_products(&self, filter: &ProductFilter, page: Page) -> StoreResult<Vec<Product>> {
        let (sub, cat, fam) = scope_binds(filter.scope);
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} {PRODUCT_QUERY_FROM} ORDER BY p.name, p.id OFFSET $6 LIMIT $7"
        );
        let rows = sqlx::query(&sql)
            .bind(sub)
            .bind(cat)
            .bind(fam)
            .bind(filter.min_price.map(to_db_cents))
            .bind(filter.max_price.map(to_db_cents))
            .bind(i64::from(page.offset))
            .bind(i64::from(page.limit))
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_sqlx_error("query_products", e))?;
        decode_rows("query_products", rows, product_row)
    }

    #[instrument(skip(self), err)]
    async fn count_products(&self, filter: &ProductFilter) -> StoreResult<u64> {
        let (sub, cat, fam) = scope_binds(filter.scope);
        let sql = format!("SELECT COUNT(*) {PRODUCT_QUERY_FROM}");
        let row = sqlx::query(&sql)
            .bind(sub)
            .bind(cat)
            .bind(fam)
            .bind(filter.min_price.map(to_db_cents))
            .bind(filter.max_price.map(to_db_cents))
            .fetch_one(self.pool())
            .await
            .map_err(|e| map_sqlx_error("count_products", e))?;
        let count: i64 = row.try_get(0).map_err(|e| map_sqlx_error("count_products", e))?;
        Ok(count.max(0) as u64)
    }

    async fn insert_option_link(&self, product_id: ProductId, option_id: OptionId) -> StoreResult<()> {
        let q = sqlx::query("INSERT INTO option_products (product_id, option_id) VALUES ($1, $2)")
            .bind(product_id.get())
            .bind(option_id.get());
        self.execute("insert_option_link", q).await.map(drop)
    }

    async fn delete_option_link(&self, product_id: ProductId, option_id: OptionId) -> StoreResult<()> {
        let q = sqlx::query("DELETE FROM option_products WHERE product_id = $1 AND option_id = $2")
            .bind(product_id.get())
            .bind(option_id.get());
        self.execute("delete_option_link", q).await.map(drop)
    }

    async fn delete_option_links(&self, product_id: ProductId) -> StoreResult<()> {
        let q = sqlx::query("DELETE FROM option_products WHERE product_id = $1").bind(product_id.get());
        self.execute("delete_option_links", q).await.map(drop)
    }

    async fn list_option_links(&self, product_id: ProductId) -> StoreResult<Vec<OptionId>> {
        let rows = sqlx::query("SELECT option_id FROM option_products WHERE product_id = $1")
            .bind(product_id.get())
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_sqlx_error("list_option_links", e))?;
        rows.iter()
            .map(|row| {
                row.try_get::<i64, _>("option_id")
                    .map(OptionId::new)
                    .map_err(|e| map_sqlx_error("list_option_links", e))
            })
            .collect()
    }

    #[instrument(skip(self), err)]
    async fn insert_variant(&self, variant: &NewVariant) -> StoreResult<Variant> {
        let row = sqlx::query(
            r#"
            INSERT INTO variants (product_id, price, stock)
            VALUES ($1, $2, $3)
            RETURNING id, product_id, price, stock
            "#,
        )
        .bind(variant.product_id.get())
        .bind(to_db_cents(variant.price))
        .bind(variant.stock)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_sqlx_error("insert_variant", e))?;
        variant_row(&row).map_err(|e| map_sqlx_error("insert_variant", e))
    }

    async fn delete_variant(&self, id: VariantId) -> StoreResult<()> {
        let q = sqlx::query("DELETE FROM variants WHERE id = $1").bind(id.get());
        self.execute("delete_variant", q).await.map(drop)
    }

    async fn delete_variants(&self, product_id: ProductId) -> StoreResult<()> {
        let q = sqlx::query("DELETE FROM variants WHERE product_id = $1").bind(product_id.get());
        self.execute("delete_variants", q).await.map(drop)
    }

    async fn list_variants(&self, product_ids: &[ProductId]) -> StoreResult<Vec<Variant>> {
        let ids: Vec<i64> = product_ids.iter().map(|id| id.get()).collect();
        let rows = sqlx::query(
            "SELECT id, product_id, price, stock FROM variants WHERE product_id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("list_variants", e))?;
        decode_rows("list_variants", rows, variant_row)
    }

    async fn list_all_variants(&self) -> StoreResult<Vec<Variant>> {
        let rows = sqlx::query("SELECT id, product_id, price, stock FROM variants ORDER BY id")
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_sqlx_error("list_all_variants", e))?;
        decode_rows("list_all_variants", rows, variant_row)
    }

    async fn insert_variant_feature(&self, variant_id: VariantId, feature_id: FeatureId) -> StoreResult<()> {
        let q = sqlx::query("INSERT INTO variant_features (variant_id, feature_id) VALUES ($1, $2)")
            .bind(variant_id.get())
            .bind(feature_id.get());
        self.execute("insert_variant_feature", q).await.map(drop)
    }

    async fn delete_variant_feature(&self, variant_id: VariantId, feature_id: FeatureId) -> StoreResult<()> {
        let q = sqlx::query("DELETE FROM variant_features WHERE variant_id = $1 AND feature_id = $2")
            .bind(variant_id.get())
            .bind(feature_id.get());
        self.execute("delete_variant_feature", q).await.map(drop)
    }

    async fn delete_variant_features(&self, variant_ids: &[VariantId]) -> StoreResult<()> {
        let ids: Vec<i64> = variant_ids.iter().map(|id| id.get()).collect();
        let q = sqlx::query("DELETE FROM variant_features WHERE variant_id = ANY($1)").bind(ids);
        self.execute("delete_variant_features", q).await.map(drop)
    }

    async fn list_variant_features(&self, variant_ids: &[VariantId]) -> StoreResult<Vec<VariantFeature>> {
        let ids: Vec<i64> = variant_ids.iter().map(|id| id.get()).collect();
        let rows = sqlx::query(
            "SELECT variant_id, feature_id FROM variant_features WHERE variant_id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("list_variant_features", e))?;
        decode_rows("list_variant_features", rows, variant_feature_row)
    }
}

#[async_trait::async_trait]
impl ProfileStore for PostgresCatalogStore {
    #[instrument(skip(self), err)]
    async fn list_profiles(&self) -> StoreResult<Vec<Profile>> {
        let rows = sqlx::query(
            "SELECT id, full_name, avatar_url, created_at, updated_at FROM profiles ORDER BY created_at DESC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("list_profiles", e))?;
        decode_rows("list_profiles", rows, profile_row)
    }

    async fn get_profile(&self, id: UserId) -> StoreResult<Option<Profile>> {
        let row = sqlx::query(
            "SELECT id, full_name, avatar_url, created_at, updated_at FROM profiles WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("get_profile", e))?;
        decode_opt("get_profile", row, profile_row)
    }

    #[instrument(skip(self, profile), fields(user_id = %profile.id), err)]
    async fn upsert_profile(&self, profile: &Profile) -> StoreResult<Profile> {
        let row = sqlx::query(
            r#"
            INSERT INTO profiles (id, full_name, avatar_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                full_name = EXCLUDED.full_name,
                avatar_url = EXCLUDED.avatar_url,
                updated_at = EXCLUDED.updated_at
            RETURNING id, full_name, avatar_url, created_at, updated_at
            "#,
        )
        .bind(profile.id.as_uuid())
        .bind(&profile.full_name)
        .bind(&profile.avatar_url)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_sqlx_error("upsert_profile", e))?;
        profile_row(&row).map_err(|e| map_sqlx_error("upsert_profile", e))
    }

    #[instrument(skip(self, update), err)]
    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Profile>> {
        let row = sqlx::query(
            r#"
            UPDATE profiles SET
                full_name = COALESCE($2, full_name),
                avatar_url = $3,
                updated_at = $4
            WHERE id = $1
            RETURNING id, full_name, avatar_url, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(&update.full_name)
        .bind(&update.avatar_url)
        .bind(now)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("update_profile", e))?;
        decode_opt("update_profile", row, profile_row)
    }

    #[instrument(skip(self), err)]
    async fn delete_profile(&self, id: UserId) -> StoreResult<bool> {
        let q = sqlx::query("DELETE FROM profiles WHERE id = $1").bind(id.as_uuid());
        Ok(self.execute("delete_profile", q).await? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_binds_only_one_level() {
        assert_eq!(scope_binds(TaxonomyScope::All), (None, None, None));
        assert_eq!(
            scope_binds(TaxonomyScope::Category(CategoryId::new(4))),
            (None, Some(4), None)
        );
        assert_eq!(
            scope_binds(TaxonomyScope::Family(FamilyId::new(9))),
            (None, None, Some(9))
        );
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert_eq!(
            map_sqlx_error("get_product", sqlx::Error::RowNotFound),
            StoreError::NotFound("get_product")
        );
    }

    #[test]
    fn cents_conversions_saturate() {
        assert_eq!(cents(-5), 0);
        assert_eq!(to_db_cents(u64::MAX), i64::MAX);
        assert_eq!(to_db_cents(1999), 1999);
    }
}
