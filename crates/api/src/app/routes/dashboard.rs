use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use vitrina_auth::Permission;

use crate::app::dto::TopProductsQuery;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

/// Dashboard panels. Store failures show up as zeros, never as errors.
pub fn router() -> Router {
    Router::new()
        .route("/", get(overview))
        .route("/stats", get(stats))
        .route("/top-products", get(top_products))
        .route("/categories", get(category_stats))
        .route("/families", get(family_stats))
}

pub async fn overview(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::DASHBOARD_READ]) {
        return res;
    }
    Json(services.catalog.dashboard_overview().await).into_response()
}

pub async fn stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::DASHBOARD_READ]) {
        return res;
    }
    Json(services.catalog.dashboard_stats().await).into_response()
}

pub async fn top_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<TopProductsQuery>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::DASHBOARD_READ]) {
        return res;
    }
    Json(services.catalog.top_products_by_stock(query.limit).await).into_response()
}

pub async fn category_stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::DASHBOARD_READ]) {
        return res;
    }
    Json(services.catalog.category_stats().await).into_response()
}

pub async fn family_stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::DASHBOARD_READ]) {
        return res;
    }
    Json(services.catalog.family_stats().await).into_response()
}
