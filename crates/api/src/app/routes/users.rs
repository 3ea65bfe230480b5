use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{get, put},
    Json, Router,
};

use vitrina_auth::{CreateUserInput, Permission, UpdateProfileInput};
use vitrina_core::UserId;

use crate::app::dto::CreatedUser;
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", put(update_profile).delete(delete_user))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::USERS_READ]) {
        return res;
    }
    errors::respond(StatusCode::OK, services.users.list_users().await)
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CreateUserInput>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::USERS_WRITE]) {
        return res;
    }
    let result = services.users.create_user(&body).await.map(|user_id| CreatedUser { user_id });
    errors::respond(StatusCode::CREATED, result)
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateProfileInput>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::USERS_WRITE]) {
        return res;
    }
    let id: UserId = match errors::parse_id(&id, "user") {
        Ok(id) => id,
        Err(res) => return res,
    };
    errors::respond(StatusCode::OK, services.users.update_profile(id, &body).await)
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(res) = require(&principal, &[Permission::USERS_WRITE]) {
        return res;
    }
    let id: UserId = match errors::parse_id(&id, "user") {
        Ok(id) => id,
        Err(res) => return res,
    };
    errors::respond_no_content(services.users.delete_user(id).await)
}

/// Profile of the caller.
pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    errors::respond(StatusCode::OK, services.users.current_profile(principal.user_id()).await)
}
