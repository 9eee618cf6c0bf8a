//! Decrypt a document fetched from the item store.

use tracing::trace;

use super::{CodecError, Document, ID_FIELD};
use crate::crypto::{self, CipherError};

/// Decrypt every non-`id` field of `document` with `secret`.
///
/// Fields that are not encrypted envelopes are passed through unchanged, so
/// documents written without encryption (or only partly encrypted) decode
/// cleanly. An empty `secret` returns the document untouched.
///
/// # Errors
///
/// Returns [`CodecError::DecryptionFailure`] as soon as a field that *is* an
/// envelope cannot be decrypted: wrong secret, tampered or corrupt data, or
/// an unsupported scheme version. Nothing partially decrypted is returned.
pub fn decode(document: Document, secret: &[u8]) -> Result<Document, CodecError> {
    if secret.is_empty() {
        return Ok(document);
    }

    let mut decoded = Document::new();
    for (field, value) in document {
        if field == ID_FIELD {
            decoded.insert(field, value);
            continue;
        }

        let ciphertext = value.to_string();
        match crypto::decrypt(secret, ciphertext.as_bytes()) {
            Ok(plain) => {
                decoded.insert(field, plain);
            }
            Err(CipherError::NotCiphertext) => {
                trace!(field = %field, "field is not encrypted; passing through");
                decoded.insert(field, value);
            }
            Err(source) => return Err(CodecError::DecryptionFailure { field, source }),
        }
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode, parse_document};
    use crate::crypto::SchemeVersion;
    use serde_json::json;

    #[test]
    fn concrete_scenario() {
        let (id, encoded) =
            encode(r#"{"id":"x","secret_val":"hello"}"#, b"k1", SchemeVersion::V1).unwrap();
        assert_eq!(id, "x");
        assert_eq!(encoded["secret_val"]["version"], 1);

        let decoded = decode(encoded.clone(), b"k1").unwrap();
        assert_eq!(
            serde_json::Value::Object(decoded),
            json!({"id": "x", "secret_val": "hello"})
        );

        let err = decode(encoded, b"wrong-key").unwrap_err();
        assert!(matches!(
            err,
            CodecError::DecryptionFailure { ref field, .. } if field == "secret_val"
        ));
    }

    #[test]
    fn plaintext_fields_pass_through() {
        let (_, mut doc) =
            encode(r#"{"id":"db","password":"s3cr3t"}"#, b"k", SchemeVersion::V3).unwrap();
        doc.insert("host".into(), json!("db.internal"));
        doc.insert("ports".into(), json!([5432, 5433]));

        let decoded = decode(doc, b"k").unwrap();
        assert_eq!(decoded["password"], json!("s3cr3t"));
        assert_eq!(decoded["host"], json!("db.internal"));
        assert_eq!(decoded["ports"], json!([5432, 5433]));
    }

    #[test]
    fn wholly_plaintext_document_is_unchanged() {
        let doc = parse_document(r#"{"id":"p","a":1,"b":{"c":"d"}}"#).unwrap();
        assert_eq!(decode(doc.clone(), b"k").unwrap(), doc);
    }

    #[test]
    fn empty_secret_is_noop() {
        let (_, encoded) =
            encode(r#"{"id":"x","secret_val":"hello"}"#, b"k1", SchemeVersion::V2).unwrap();
        assert_eq!(decode(encoded.clone(), b"").unwrap(), encoded);
    }

    #[test]
    fn id_is_never_decrypted() {
        // An `id` shaped like ciphertext would still be left alone.
        let (_, encoded) = encode(r#"{"id":"x","v":"1"}"#, b"k", SchemeVersion::V3).unwrap();
        let mut doc = Document::new();
        doc.insert("id".into(), encoded["v"].clone());
        assert_eq!(decode(doc.clone(), b"k").unwrap(), doc);
    }

    #[test]
    fn corrupt_envelope_aborts() {
        let doc = parse_document(
            r#"{"id":"x","bad":{"encrypted_data":"!!!","iv":"AAAA","version":1,"cipher":"aes-256-cbc"}}"#,
        )
        .unwrap();
        let err = decode(doc, b"k").unwrap_err();
        assert!(matches!(
            err,
            CodecError::DecryptionFailure {
                source: CipherError::InvalidFormat("encrypted_data"),
                ..
            }
        ));
    }

    #[test]
    fn unsupported_version_aborts() {
        let doc = parse_document(
            r#"{"id":"x","old":{"encrypted_data":"AAAA","iv":"AAAA","version":0,"cipher":"aes-256-cbc"}}"#,
        )
        .unwrap();
        assert!(matches!(
            decode(doc, b"k"),
            Err(CodecError::DecryptionFailure {
                source: CipherError::UnsupportedVersion(0),
                ..
            })
        ));
    }

    #[test]
    fn mixed_versions_decode_together() {
        let mut doc = Document::new();
        doc.insert("id".into(), json!("mixed"));
        for version in SchemeVersion::ALL {
            let (_, encoded) = encode(
                &json!({"id": "mixed", "v": version.as_u8()}).to_string(),
                b"k",
                version,
            )
            .unwrap();
            doc.insert(format!("v{}", version.as_u8()), encoded["v"].clone());
        }
        let decoded = decode(doc, b"k").unwrap();
        assert_eq!(decoded["v1"], json!(1));
        assert_eq!(decoded["v2"], json!(2));
        assert_eq!(decoded["v3"], json!(3));
    }
}
