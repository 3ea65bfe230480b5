//! HTTP application wiring (axum router + service wiring).
//!
//! - `services.rs`: storage and identity backends, actions
//! - `routes/`: handlers, one file per area; public storefront and `/admin`
//! - `dto.rs`: request/response bodies not owned by the domain crates
//! - `errors.rs`: action failures rendered as JSON errors

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use vitrina_auth::Hs256Jwt;

use crate::config::AppConfig;
use crate::middleware::{self, AuthState};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: AppConfig) -> anyhow::Result<Router> {
    let tokens = Arc::new(Hs256Jwt::new(config.jwt_secret.as_bytes()));
    let auth_state = AuthState { jwt: tokens.clone() };
    let services = services::build_services(&config, tokens).await?;
    Ok(router(Arc::new(services), auth_state))
}

/// Public storefront routes plus `/admin`, which requires a bearer token.
pub fn router(services: Arc<AppServices>, auth_state: AuthState) -> Router {
    let protected = routes::admin_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    routes::public_router()
        .nest("/admin", protected)
        .layer(Extension(services))
        .layer(ServiceBuilder::new())
}
