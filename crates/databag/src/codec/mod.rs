//! Item document encoding (prepare-for-write) and decoding (prepare-after-read).
//!
//! # Module invariants
//!
//! - The `id` field is never encrypted, decrypted or re-serialised.
//! - Every other top-level field is handled independently.
//! - Both directions are all-or-nothing: on error no document is returned.
//! - No store or HTTP dependencies; both functions are pure.

pub mod decoder;
pub mod encoder;

pub use decoder::decode;
pub use encoder::encode;

use serde_json::Value;
use thiserror::Error;

use crate::crypto::CipherError;

/// Name of the reserved identity field.
pub const ID_FIELD: &str = "id";

/// A data bag item document: field name → arbitrary JSON value.
///
/// `serde_json` is built without `preserve_order`, so serialising a document
/// emits its keys in sorted order.
pub type Document = serde_json::Map<String, Value>;

/// Errors produced while encoding or decoding a document.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The input is not valid JSON, or not a JSON object.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The `id` attribute is absent, not a string, or empty.
    #[error("content_json must have an id attribute set to a non-empty string")]
    MissingIdentity,

    /// A field could not be encrypted.
    #[error("failed to encrypt field `{field}`: {source}")]
    EncryptionFailure {
        field: String,
        #[source]
        source: CipherError,
    },

    /// A field is ciphertext but could not be decrypted.
    #[error("failed to decrypt field `{field}`: {source}")]
    DecryptionFailure {
        field: String,
        #[source]
        source: CipherError,
    },
}

/// Parse `text` into a [`Document`].
pub fn parse_document(text: &str) -> Result<Document, CodecError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CodecError::MalformedInput(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
        Err(e) => Err(CodecError::MalformedInput(e.to_string())),
    }
}

/// Return the document's identity.
pub fn item_id(document: &Document) -> Result<&str, CodecError> {
    match document.get(ID_FIELD) {
        Some(Value::String(id)) if !id.is_empty() => Ok(id),
        _ => Err(CodecError::MissingIdentity),
    }
}

/// Normalise JSON text so that equal documents compare equal as strings.
///
/// Whitespace is removed and object keys are sorted.
pub fn normalize_json(text: &str) -> Result<String, CodecError> {
    serde_json::from_str::<Value>(text)
        .map(|v| v.to_string())
        .map_err(|e| CodecError::MalformedInput(e.to_string()))
}

/// Render a document as normalised JSON text.
pub fn render(document: Document) -> String {
    Value::Object(document).to_string()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_document_rejects_non_objects() {
        for text in ["[1,2]", "\"id\"", "7", "null"] {
            assert!(matches!(
                parse_document(text),
                Err(CodecError::MalformedInput(_))
            ));
        }
        assert!(matches!(
            parse_document("{not json"),
            Err(CodecError::MalformedInput(_))
        ));
    }

    #[test]
    fn item_id_requires_non_empty_string() {
        let ok = parse_document(r#"{"id":"x"}"#).unwrap();
        assert_eq!(item_id(&ok).unwrap(), "x");

        for text in [r#"{"foo":"bar"}"#, r#"{"id":""}"#, r#"{"id":7}"#, r#"{"id":null}"#] {
            let doc = parse_document(text).unwrap();
            assert!(matches!(item_id(&doc), Err(CodecError::MissingIdentity)));
        }
    }

    #[test]
    fn normalize_json_sorts_and_compacts() {
        let a = normalize_json("{ \"b\": 1,\n  \"a\": [true, null] }").unwrap();
        let b = normalize_json(r#"{"a":[true,null],"b":1}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, r#"{"a":[true,null],"b":1}"#);
    }

    #[test]
    fn normalize_json_rejects_garbage() {
        assert!(normalize_json("{").is_err());
    }
}
