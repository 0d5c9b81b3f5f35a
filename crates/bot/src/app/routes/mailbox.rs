//! The caller's own private messages.
//!
//! Stands in for the messaging platform's DM view: members read what was
//! delivered to them, delete messages, and opt out of direct messages.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use keydrop_core::{DeliveryHandle, RecipientId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub async fn inbox(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<ActorContext>,
) -> impl IntoResponse {
    let messages: Vec<dto::MailboxMessageResponse> = services
        .mailbox()
        .inbox(RecipientId::from(caller.actor_id()))
        .into_iter()
        .map(Into::into)
        .collect();

    Json(serde_json::json!({ "messages": messages }))
}

pub async fn delete_message(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<ActorContext>,
    Path(message_id): Path<String>,
) -> axum::response::Response {
    let handle: DeliveryHandle = match message_id.trim().parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if services.mailbox().delete_message(RecipientId::from(caller.actor_id()), handle) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        errors::json_error(StatusCode::NOT_FOUND, "not_found", format!("no message {handle} in your inbox"))
    }
}

pub async fn update_settings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<ActorContext>,
    Json(body): Json<dto::MailboxSettingsRequest>,
) -> impl IntoResponse {
    let recipient = RecipientId::from(caller.actor_id());
    services
        .mailbox()
        .set_accepts_direct_messages(recipient, body.accept_direct_messages);

    Json(serde_json::json!({
        "accept_direct_messages": services.mailbox().accepts_direct_messages(recipient),
    }))
}
