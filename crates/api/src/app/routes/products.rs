use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};

use vitrina_auth::Permission;
use vitrina_catalog::ProductCreation;
use vitrina_core::ProductId;
use vitrina_infra::actions::products::{ManualVariant, PlannedVariantEdit, PlannedVariantRemoval, VariantPlan};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product).delete(delete_product))
}

/// Variant planning for the product form; nothing is stored.
pub fn variants_router() -> Router {
    Router::new()
        .route("/generate", post(generate_variants))
        .route("/manual", post(add_manual_variant))
        .route("/edit", post(edit_planned_variant))
        .route("/remove", post(remove_planned_variant))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_READ]) {
        return res;
    }
    errors::respond(StatusCode::OK, services.catalog.list_products_admin().await)
}

/// Product, option links and variants in one request. A failure midway
/// leaves nothing behind.
pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<ProductCreation>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_WRITE]) {
        return res;
    }
    errors::respond(StatusCode::CREATED, services.catalog.create_product(&body).await)
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_READ]) {
        return res;
    }
    let id: ProductId = match errors::parse_id(&id, "product") {
        Ok(id) => id,
        Err(res) => return res,
    };
    errors::respond(StatusCode::OK, services.catalog.product_detail(id).await)
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_WRITE]) {
        return res;
    }
    let id: ProductId = match errors::parse_id(&id, "product") {
        Ok(id) => id,
        Err(res) => return res,
    };
    errors::respond_no_content(services.catalog.delete_product(id).await)
}

pub async fn generate_variants(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<VariantPlan>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_WRITE]) {
        return res;
    }
    errors::respond(StatusCode::OK, services.catalog.generate_variants(&body).await)
}

pub async fn add_manual_variant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<ManualVariant>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_WRITE]) {
        return res;
    }
    errors::respond(StatusCode::OK, services.catalog.add_manual_variant(&body).await)
}

pub async fn edit_planned_variant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<PlannedVariantEdit>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_WRITE]) {
        return res;
    }
    errors::respond(StatusCode::OK, services.catalog.edit_planned_variant(&body).await)
}

pub async fn remove_planned_variant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<PlannedVariantRemoval>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_WRITE]) {
        return res;
    }
    errors::respond(StatusCode::OK, services.catalog.remove_planned_variant(&body).await)
}
