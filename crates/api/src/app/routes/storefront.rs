//! Public storefront: listing, filters, product pages, SEO metadata and the
//! sitemap. No authentication.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use vitrina_catalog::{FilterParams, PageMeta, SitemapEntry};

use crate::app::dto::CountResponse;
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/count", get(count_products))
        .route("/products/:slug", get(get_product))
        .route("/filters", get(filters))
        .route("/sitemap", get(sitemap))
        .route("/meta/listing", get(listing_meta))
        .route("/meta/products/:slug", get(product_meta))
}

/// `?familia=&categoria=&subcategoria=&precioMin=&precioMax=&offset=&limit=`
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<FilterParams>,
) -> Response {
    errors::respond(
        StatusCode::OK,
        services.catalog.public_products(&params.filter(), params.page()).await,
    )
}

pub async fn count_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<FilterParams>,
) -> Response {
    let result = services
        .catalog
        .product_count(&params.filter())
        .await
        .map(|count| CountResponse { count });
    errors::respond(StatusCode::OK, result)
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(slug): Path<String>,
) -> Response {
    errors::respond(StatusCode::OK, services.catalog.product_by_slug(&slug).await)
}

pub async fn filters(Extension(services): Extension<Arc<AppServices>>) -> Response {
    errors::respond(StatusCode::OK, services.catalog.filters_data().await)
}

pub async fn sitemap(Extension(services): Extension<Arc<AppServices>>) -> Json<Vec<SitemapEntry>> {
    Json(services.catalog.sitemap(&services.public_base_url, Utc::now()).await)
}

pub async fn listing_meta(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<FilterParams>,
) -> Json<PageMeta> {
    Json(services.catalog.listing_meta(&services.public_base_url, &params.filter()).await)
}

pub async fn product_meta(
    Extension(services): Extension<Arc<AppServices>>,
    Path(slug): Path<String>,
) -> Json<PageMeta> {
    Json(services.catalog.product_meta(&services.public_base_url, &slug).await)
}
