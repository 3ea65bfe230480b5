use axum::{
    routing::{get, post},
    Router,
};

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod families;
pub mod features;
pub mod options;
pub mod products;
pub mod storefront;
pub mod stream;
pub mod subcategories;
pub mod system;
pub mod users;

/// Routes open to anyone: storefront reads and login.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/auth/login", post(auth::login))
        .merge(storefront::router())
}

/// Routes mounted under `/admin`, behind the auth middleware.
pub fn admin_router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/me", get(users::me))
        .route("/stream", get(stream::stream))
        .nest("/families", families::router())
        .nest("/categories", categories::router())
        .nest("/subcategories", subcategories::router())
        .nest("/options", options::router())
        .nest("/features", features::router())
        .nest("/products", products::router())
        .nest("/variants", products::variants_router())
        .nest("/users", users::router())
        .nest("/dashboard", dashboard::router())
}
