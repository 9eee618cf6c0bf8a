//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::EncryptionFailure`] → 500
/// - [`ServiceError::DecryptionFailure`] → 500
/// - [`ServiceError::Store`] → the status reported by the item store
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed — invalid JSON, not an object, or no usable `id`.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A field could not be encrypted.
    #[error("encryption failure: {0}")]
    EncryptionFailure(String),

    /// A field looked like ciphertext but could not be decrypted.
    #[error("decryption failure: {0}")]
    DecryptionFailure(String),

    /// The item store rejected the operation with the given status.
    #[error("store error ({status}): {message}")]
    Store { status: u16, message: String },

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    ///
    /// Store statuses outside the 4xx/5xx range are reported as 502.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::EncryptionFailure(_) => 500,
            ServiceError::DecryptionFailure(_) => 500,
            ServiceError::Store { status, .. } if (400..600).contains(status) => *status,
            ServiceError::Store { .. } => 502,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in [`crate::protocol::ErrorResponse`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::EncryptionFailure(_) => "encryption_failure",
            ServiceError::DecryptionFailure(_) => "decryption_failure",
            ServiceError::Store { status: 404, .. } => "not_found",
            ServiceError::Store { status: 409, .. } => "conflict",
            ServiceError::Store { .. } => "store_error",
            ServiceError::Internal(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(ServiceError::BadRequest("x".into()).http_status(), 400);
        assert_eq!(
            ServiceError::EncryptionFailure("x".into()).http_status(),
            500
        );
        assert_eq!(
            ServiceError::DecryptionFailure("x".into()).http_status(),
            500
        );
        assert_eq!(ServiceError::Internal("x".into()).http_status(), 500);
    }

    #[test]
    fn store_status_passes_through() {
        let e = ServiceError::Store {
            status: 409,
            message: "item exists".into(),
        };
        assert_eq!(e.http_status(), 409);
        assert_eq!(e.code(), "conflict");
    }

    #[test]
    fn store_status_out_of_range_is_bad_gateway() {
        let e = ServiceError::Store {
            status: 302,
            message: "redirected".into(),
        };
        assert_eq!(e.http_status(), 502);
        assert_eq!(e.code(), "store_error");
    }

    #[test]
    fn display_includes_message() {
        let e = ServiceError::BadRequest("content_json must have an id".into());
        assert!(e.to_string().contains("content_json must have an id"));
    }
}
