//! Axum request handlers for all service endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{
    CreatedItem, DecodeBody, EncodeRequest, EncodeResponse, ErrorResponse, HealthResponse,
    ItemResponse,
};
use common::ServiceError;
use serde_json::Value;
use tracing::warn;

use super::state::AppState;
use crate::codec::{self, CodecError};
use crate::reconciler::ReconcileError;

/// `POST /encode` — encrypt every non-`id` field of `content_json`.
///
/// Uses the configured secret and encryption version. Nothing is stored.
pub async fn encode(State(state): State<AppState>, Json(req): Json<EncodeRequest>) -> Response {
    match codec::encode(
        &req.content_json,
        state.secret.as_bytes(),
        state.encryption_version,
    ) {
        Ok((item_id, document)) => {
            let body = EncodeResponse {
                item_id,
                content: Value::Object(document),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => error_response(e.into()),
    }
}

/// `POST /decode` — decrypt a stored document with the configured secret.
pub async fn decode(State(state): State<AppState>, Json(body): Json<DecodeBody>) -> Response {
    let Value::Object(document) = body.content else {
        return error_response(ServiceError::BadRequest(
            "content must be a JSON object".into(),
        ));
    };

    match codec::decode(document, state.secret.as_bytes()) {
        Ok(decoded) => {
            let body = DecodeBody {
                content: Value::Object(decoded),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => error_response(e.into()),
    }
}

/// `POST /bags/{bag}/items` — encrypt and create an item.
pub async fn create_item(
    State(state): State<AppState>,
    Path(bag): Path<String>,
    Json(req): Json<EncodeRequest>,
) -> Response {
    match state.reconciler.create(
        &bag,
        &req.content_json,
        state.secret.as_bytes(),
        state.encryption_version,
    ) {
        Ok(item_id) => (StatusCode::CREATED, Json(CreatedItem { item_id })).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// `GET /bags/{bag}/items/{item_id}` — read and decrypt an item.
///
/// A missing item is reported as `exists: false` with status 200.
pub async fn read_item(
    State(state): State<AppState>,
    Path((bag, item_id)): Path<(String, String)>,
) -> Response {
    match state
        .reconciler
        .read_content_json(&bag, &item_id, state.secret.as_bytes())
    {
        Ok(content_json) => {
            let body = ItemResponse {
                exists: content_json.is_some(),
                content_json,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => error_response(e.into()),
    }
}

/// `DELETE /bags/{bag}/items/{item_id}` — delete an item.
pub async fn delete_item(
    State(state): State<AppState>,
    Path((bag, item_id)): Path<(String, String)>,
) -> Response {
    match state.reconciler.delete(&bag, &item_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// `GET /health` — liveness check.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        encryption_enabled: !state.secret.is_empty(),
        encryption_version: state.encryption_version.as_u8(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

impl From<CodecError> for ServiceError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::MalformedInput(_) | CodecError::MissingIdentity => {
                ServiceError::BadRequest(err.to_string())
            }
            CodecError::EncryptionFailure { .. } => ServiceError::EncryptionFailure(err.to_string()),
            CodecError::DecryptionFailure { .. } => ServiceError::DecryptionFailure(err.to_string()),
        }
    }
}

impl From<ReconcileError> for ServiceError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::Codec(e) => e.into(),
            ReconcileError::Store(e) => ServiceError::Store {
                status: e.status,
                message: e.message,
            },
        }
    }
}

fn error_response(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        warn!(error = %err, "request failed");
    }
    (status, Json(ErrorResponse::from(&err))).into_response()
}
