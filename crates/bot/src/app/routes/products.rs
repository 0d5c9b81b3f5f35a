use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use keydrop_auth::Actor;
use keydrop_core::ActorId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

/// Anonymous callers list as actor 0; listing carries no authorization.
const ANONYMOUS: ActorId = ActorId::new(0);

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    let listing = services.engine.list(&Actor::member(ANONYMOUS));
    Json(dto::ProductListResponse::from(listing))
}

pub async fn register_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<ActorContext>,
    Json(body): Json<dto::RegisterProductRequest>,
) -> axum::response::Response {
    if let Err(e) = body.validate() {
        return errors::domain_error_to_response(e);
    }

    // Registration fsyncs the catalog file; keep that off the async workers.
    let actor = caller.actor().clone();
    let result =
        tokio::task::spawn_blocking(move || services.engine.register(&actor, &body.name, &body.link)).await;

    match result {
        Ok(Ok(registration)) => {
            let status = if registration.replaced.is_some() {
                StatusCode::OK
            } else {
                StatusCode::CREATED
            };
            (status, Json(dto::RegistrationResponse::from(registration))).into_response()
        }
        Ok(Err(e)) => errors::engine_error_to_response(e),
        Err(join) => {
            tracing::error!(error = %join, "registration task failed");
            errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "registration did not complete")
        }
    }
}
