use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use keydrop_core::DomainError;
use keydrop_infra::EngineError;

pub fn engine_error_to_response(err: EngineError) -> axum::response::Response {
    match &err {
        EngineError::Unauthorized(e) => json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()),
        EngineError::UnknownProduct(_) => json_error(StatusCode::NOT_FOUND, "unknown_product", err.to_string()),
        EngineError::DeliveryBlocked(_) => json_error(StatusCode::CONFLICT, "delivery_blocked", err.to_string()),
        EngineError::NoActiveGrant { .. } => json_error(StatusCode::NOT_FOUND, "no_active_grant", err.to_string()),
        EngineError::Persistence(e) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "persistence_error",
            format!("product saved in memory but not persisted: {}", e.source),
        ),
        EngineError::DeliveryFailed(e) => json_error(StatusCode::BAD_GATEWAY, "delivery_failed", e.to_string()),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
