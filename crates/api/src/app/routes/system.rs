use axum::{extract::Extension, http::StatusCode, Json};

use crate::app::dto::WhoAmI;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> Json<WhoAmI> {
    Json(WhoAmI {
        user_id: principal.user_id(),
        email: principal.email().to_string(),
        roles: principal.roles().iter().map(|r| r.as_str().to_string()).collect(),
    })
}
