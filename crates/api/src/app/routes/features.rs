use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{post, put},
    Json, Router,
};

use vitrina_auth::Permission;
use vitrina_catalog::FeatureInput;
use vitrina_core::FeatureId;

use crate::app::dto::FeatureValueRequest;
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

/// Features are listed under their option; only writes live here.
pub fn router() -> Router {
    Router::new()
        .route("/", post(create_feature))
        .route("/:id", put(update_feature).delete(delete_feature))
}

pub async fn create_feature(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<FeatureInput>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_WRITE]) {
        return res;
    }
    errors::respond(StatusCode::CREATED, services.catalog.create_feature(&body).await)
}

pub async fn update_feature(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<FeatureValueRequest>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_WRITE]) {
        return res;
    }
    let id: FeatureId = match errors::parse_id(&id, "feature") {
        Ok(id) => id,
        Err(res) => return res,
    };
    errors::respond(StatusCode::OK, services.catalog.update_feature(id, &body.value).await)
}

pub async fn delete_feature(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_WRITE]) {
        return res;
    }
    let id: FeatureId = match errors::parse_id(&id, "feature") {
        Ok(id) => id,
        Err(res) => return res,
    };
    errors::respond_no_content(services.catalog.delete_feature(id).await)
}
