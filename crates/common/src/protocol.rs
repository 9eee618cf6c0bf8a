//! Request and response types exchanged over the service's HTTP API.
//!
//! Item content crosses this boundary in two shapes: `content_json`, the JSON
//! document as text (what a resource definition stores), and `content`, an
//! already-parsed JSON object.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Encode / decode endpoints
// ---------------------------------------------------------------------------

/// Request body for `POST /encode` and `POST /bags/{bag}/items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeRequest {
    /// Item document as JSON text. Must be an object with a string `id`.
    pub content_json: String,
}

/// Successful response body for `POST /encode`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeResponse {
    /// Value of the document's `id` field.
    pub item_id: String,
    /// Document with every non-`id` field replaced by its encrypted form.
    pub content: serde_json::Value,
}

/// Request and response body for `POST /decode`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeBody {
    /// A stored item document, possibly partially encrypted.
    pub content: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Item endpoints
// ---------------------------------------------------------------------------

/// Response body for `POST /bags/{bag}/items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedItem {
    pub item_id: String,
}

/// Response body for `GET /bags/{bag}/items/{id}`.
///
/// An item that does not exist is reported with `exists: false` and no
/// content rather than as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResponse {
    pub exists: bool,
    /// Decrypted document as normalised JSON text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_json: Option<String>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status, always `"ok"` once the server is up.
    pub status: String,
    /// Whether a secret key is configured.
    pub encryption_enabled: bool,
    /// Scheme version used for new encryptions.
    pub encryption_version: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServiceError;

    #[test]
    fn item_response_omits_absent_content() {
        let absent = ItemResponse {
            exists: false,
            content_json: None,
        };
        let json = serde_json::to_value(&absent).unwrap();
        assert_eq!(json, serde_json::json!({"exists": false}));

        let decoded: ItemResponse = serde_json::from_str(r#"{"exists":false}"#).unwrap();
        assert!(decoded.content_json.is_none());
    }

    #[test]
    fn error_response_from_service_error() {
        let err = ServiceError::Store {
            status: 404,
            message: "no such item".into(),
        };
        let body = ErrorResponse::from(&err);
        assert_eq!(body.code, "not_found");
        assert!(body.message.contains("no such item"));
    }

    #[test]
    fn encode_response_serde() {
        let resp = EncodeResponse {
            item_id: "x".into(),
            content: serde_json::json!({"id": "x"}),
        };
        let json = serde_json::to_string(&resp).unwrap();
        let decoded: EncodeResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.item_id, "x");
        assert_eq!(decoded.content["id"], "x");
    }
}
