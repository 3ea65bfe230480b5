use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{post, put},
    Json, Router,
};

use vitrina_auth::Permission;
use vitrina_catalog::CategoryInput;
use vitrina_core::CategoryId;

use crate::app::dto::RenameRequest;
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

/// Categories are listed through the family tree; only writes live here.
pub fn router() -> Router {
    Router::new()
        .route("/", post(create_category))
        .route("/:id", put(update_category).delete(delete_category))
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CategoryInput>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_WRITE]) {
        return res;
    }
    errors::respond(StatusCode::CREATED, services.catalog.create_category(&body).await)
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<RenameRequest>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_WRITE]) {
        return res;
    }
    let id: CategoryId = match errors::parse_id(&id, "category") {
        Ok(id) => id,
        Err(res) => return res,
    };
    errors::respond(StatusCode::OK, services.catalog.update_category(id, &body.name).await)
}

pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_WRITE]) {
        return res;
    }
    let id: CategoryId = match errors::parse_id(&id, "category") {
        Ok(id) => id,
        Err(res) => return res,
    };
    errors::respond_no_content(services.catalog.delete_category(id).await)
}
