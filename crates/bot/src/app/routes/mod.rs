use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub mod grants;
pub mod mailbox;
pub mod products;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/grants", post(grants::grant_product))
        .route("/grants/:recipient_id", get(grants::list_grants))
        .route("/grants/:recipient_id/:product_name", delete(grants::revoke_product))
        .route("/mailbox", get(mailbox::inbox))
        .route("/mailbox/settings", put(mailbox::update_settings))
        .route("/mailbox/:message_id", delete(mailbox::delete_message))
}
