use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::error;

use vitrina_auth::{JwtClaims, Role};

use crate::app::dto::{LoginRequest, LoginResponse};
use crate::app::errors;
use crate::app::services::AppServices;

/// Password login. Every account of the identity service is an administrator.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> Response {
    let account = match services.users.login(&body.email, &body.password).await {
        Ok(account) => account,
        Err(e) => return errors::action_error_to_response(e),
    };

    let email = account.email.unwrap_or_else(|| body.email.trim().to_string());
    let claims = JwtClaims::new(account.id, email.clone(), vec![Role::ADMIN], Utc::now(), services.token_ttl);
    let token = match services.tokens.issue(&claims) {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "token signing failed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "token_error",
                "Error inesperado al iniciar sesión",
            );
        }
    };

    (
        StatusCode::OK,
        Json(LoginResponse { token, expires_at: claims.expires_at, user_id: account.id, email }),
    )
        .into_response()
}
