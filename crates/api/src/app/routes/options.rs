use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{get, put},
    Json, Router,
};

use vitrina_auth::Permission;
use vitrina_catalog::OptionInput;
use vitrina_core::OptionId;

use crate::app::dto::RenameRequest;
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_options).post(create_option))
        .route("/:id", put(update_option).delete(delete_option))
}

/// Options with their features.
pub async fn list_options(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_READ]) {
        return res;
    }
    errors::respond(StatusCode::OK, services.catalog.options_with_features().await)
}

pub async fn create_option(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<OptionInput>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_WRITE]) {
        return res;
    }
    errors::respond(StatusCode::CREATED, services.catalog.create_option(&body).await)
}

pub async fn update_option(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<RenameRequest>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_WRITE]) {
        return res;
    }
    let id: OptionId = match errors::parse_id(&id, "option") {
        Ok(id) => id,
        Err(res) => return res,
    };
    errors::respond(StatusCode::OK, services.catalog.update_option(id, &body.name).await)
}

pub async fn delete_option(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::CATALOG_WRITE]) {
        return res;
    }
    let id: OptionId = match errors::parse_id(&id, "option") {
        Ok(id) => id,
        Err(res) => return res,
    };
    errors::respond_no_content(services.catalog.delete_option(id).await)
}
