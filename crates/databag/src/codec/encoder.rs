//! Prepare a user-supplied item document for storage.

use tracing::debug;

use super::{item_id, parse_document, CodecError, Document, ID_FIELD};
use crate::crypto::{self, SchemeVersion};

/// Validate `content_json`, extract its `id`, and encrypt every other field.
///
/// Each non-`id` value is serialised to JSON and replaced by its encrypted
/// envelope. With an empty `secret` the fields are returned as plain JSON,
/// matching [`super::decode`], which treats an empty secret as "encryption
/// disabled".
///
/// # Errors
///
/// - [`CodecError::MalformedInput`] if `content_json` is not a JSON object.
/// - [`CodecError::MissingIdentity`] if `id` is absent, non-string or empty.
/// - [`CodecError::EncryptionFailure`] if any field fails to encrypt; the
///   partially encrypted document is discarded.
pub fn encode(
    content_json: &str,
    secret: &[u8],
    version: SchemeVersion,
) -> Result<(String, Document), CodecError> {
    let mut document = parse_document(content_json)?;
    let id = item_id(&document)?.to_owned();

    if secret.is_empty() {
        debug!(item_id = %id, "no secret configured; storing fields as plain JSON");
        return Ok((id, document));
    }

    for (field, value) in document.iter_mut() {
        if field == ID_FIELD {
            continue;
        }
        let plaintext = value.to_string();
        let encrypted = crypto::encrypt(secret, plaintext.as_bytes(), version).map_err(|source| {
            CodecError::EncryptionFailure {
                field: field.clone(),
                source,
            }
        })?;
        *value = encrypted.to_value();
    }

    debug!(
        item_id = %id,
        fields = document.len() - 1,
        version = %version,
        "encrypted item fields"
    );
    Ok((id, document))
}
