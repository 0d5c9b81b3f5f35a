//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: engine wiring (catalog file, mailbox, admin check, audit sink)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>, jwt_secret: &[u8]) -> Router {
    let jwt = Arc::new(keydrop_auth::Hs256JwtValidator::new(jwt_secret.to_vec()));
    let auth_state = middleware::AuthState { jwt };

    // Protected routes: require a valid bearer token.
    let protected = routes::router()
        .layer(Extension(Arc::clone(&services)))
        .layer(axum::middleware::from_fn_with_state(auth_state.clone(), middleware::auth_middleware));

    // Listing is open to everyone; registering on the same path is not.
    let products = get(routes::products::list_products).merge(
        post(routes::products::register_product)
            .route_layer(axum::middleware::from_fn_with_state(auth_state, middleware::auth_middleware)),
    );
    let public = Router::new()
        .route("/health", get(routes::system::health))
        .route("/products", products)
        .layer(Extension(services));

    Router::new().merge(public).merge(protected)
}
