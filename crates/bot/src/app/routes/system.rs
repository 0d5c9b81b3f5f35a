use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use keydrop_auth::AdminCheck;

use crate::app::services::AppServices;
use crate::context::ActorContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<ActorContext>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "actor_id": caller.actor_id().to_string(),
        "roles": caller.roles().iter().map(|r| r.to_string()).collect::<Vec<_>>(),
        "is_admin": services.admin.is_admin(caller.actor()),
    }))
}
