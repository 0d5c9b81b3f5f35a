use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use keydrop_auth::AdminCheck;
use keydrop_core::RecipientId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub async fn grant_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<ActorContext>,
    Json(body): Json<dto::GrantRequest>,
) -> axum::response::Response {
    let recipient = match dto::parse_recipient(&body.recipient_id) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.engine.grant(caller.actor(), recipient, &body.product_name).await {
        Ok(confirmation) => (StatusCode::CREATED, Json(dto::GrantResponse::from(confirmation))).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn revoke_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<ActorContext>,
    Path((recipient_id, product_name)): Path<(String, String)>,
) -> axum::response::Response {
    let recipient = match dto::parse_recipient(&recipient_id) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.engine.revoke(caller.actor(), recipient, &product_name).await {
        Ok(outcome) => (StatusCode::OK, Json(dto::RevokeResponse::from(outcome))).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

/// Admins see anyone's grants; members only their own.
pub async fn list_grants(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<ActorContext>,
    Path(recipient_id): Path<String>,
) -> axum::response::Response {
    let recipient = match dto::parse_recipient(&recipient_id) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let is_self = RecipientId::from(caller.actor_id()) == recipient;
    if !is_self && !services.admin.is_admin(caller.actor()) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", "grants of other members are admin-only");
    }

    let grants = services.engine.grants_for(recipient);
    (StatusCode::OK, Json(dto::GrantListResponse::new(recipient, grants))).into_response()
}
