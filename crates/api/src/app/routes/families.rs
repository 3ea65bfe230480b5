use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{get, put},
    Json, Router,
};

use vitrina_auth::Permission;
use vitrina_catalog::FamilyInput;
use vitrina_core::FamilyId;

use crate::app::dto::RenameRequest;
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_families).post(create_family))
        .route("/:id", put(update_family).delete(delete_family))
}

/// The whole taxonomy tree.
pub async fn list_families(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_READ]) {
        return res;
    }
    errors::respond(StatusCode::OK, services.catalog.families_with_relations().await)
}

pub async fn create_family(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<FamilyInput>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_WRITE]) {
        return res;
    }
    errors::respond(StatusCode::CREATED, services.catalog.create_family(&body).await)
}

pub async fn update_family(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<RenameRequest>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_WRITE]) {
        return res;
    }
    let id: FamilyId = match errors::parse_id(&id, "family") {
        Ok(id) => id,
        Err(res) => return res,
    };
    errors::respond(StatusCode::OK, services.catalog.update_family(id, &body.name).await)
}

pub async fn delete_family(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_WRITE]) {
        return res;
    }
    let id: FamilyId = match errors::parse_id(&id, "family") {
        Ok(id) => id,
        Err(res) => return res,
    };
    errors::respond_no_content(services.catalog.delete_family(id).await)
}
