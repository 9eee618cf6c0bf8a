//! Encryption and decryption of individual data bag item values.
//!
//! A value is encrypted as its JSON text wrapped in `{"json_wrapper": ...}`
//! and stored as an [`EncryptedField`] envelope. Decryption first decides
//! whether the input is an envelope at all: anything that is not a complete
//! envelope yields [`CipherError::NotCiphertext`], which callers treat as a
//! plaintext value rather than a failure.

use aes_gcm::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::Sha256;
use thiserror::Error;

use super::{cbc, derive_key, SchemeVersion};

type HmacSha256 = Hmac<Sha256>;

/// Byte length of a CBC initialisation vector (versions 1 and 2).
pub const CBC_IV_LEN: usize = cbc::BLOCK_LEN;

/// Byte length of an AES-GCM nonce (version 3).
pub const GCM_NONCE_LEN: usize = 12;

/// Byte length of an AES-GCM authentication tag (version 3).
pub const GCM_TAG_LEN: usize = 16;

/// Byte length of an HMAC-SHA256 digest (version 2).
pub const HMAC_LEN: usize = 32;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The input is not an encrypted value envelope.
    #[error("value is not an encrypted data bag item")]
    NotCiphertext,

    /// The envelope names a scheme version this build cannot handle.
    #[error("unsupported encryption version {0}")]
    UnsupportedVersion(i64),

    /// The envelope is recognisable but one of its attributes is malformed.
    #[error("invalid encrypted value: bad `{0}`")]
    InvalidFormat(&'static str),

    /// The derived key has the wrong length.
    #[error("invalid key length")]
    InvalidKeyLength,

    /// The version 2 HMAC does not match the ciphertext.
    #[error("hmac does not match ciphertext")]
    HmacMismatch,

    /// CBC padding was invalid after decryption.
    #[error("invalid padding after decryption")]
    BadPadding,

    /// AES-GCM encryption or authentication failed.
    #[error("aead operation failed")]
    AeadFailure,

    /// The decrypted plaintext is not a `json_wrapper` document.
    #[error("decrypted payload is not a json_wrapper document")]
    InvalidPayload,
}

/// A parsed encrypted value, tagged by scheme version.
///
/// `encrypted_data` is kept as the base64 text found on the wire because the
/// version 2 HMAC is computed over that text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncryptedField {
    V1 {
        iv: [u8; CBC_IV_LEN],
        encrypted_data: String,
    },
    V2 {
        iv: [u8; CBC_IV_LEN],
        encrypted_data: String,
        hmac: [u8; HMAC_LEN],
    },
    V3 {
        iv: [u8; GCM_NONCE_LEN],
        encrypted_data: String,
        auth_tag: [u8; GCM_TAG_LEN],
    },
}

/// Wire shape of an envelope, before validation.
#[derive(Debug, Deserialize)]
struct Envelope {
    encrypted_data: String,
    iv: String,
    version: i64,
    cipher: String,
    #[serde(default)]
    hmac: Option<String>,
    #[serde(default)]
    auth_tag: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JsonWrapper {
    json_wrapper: Value,
}

impl EncryptedField {
    pub fn version(&self) -> SchemeVersion {
        match self {
            EncryptedField::V1 { .. } => SchemeVersion::V1,
            EncryptedField::V2 { .. } => SchemeVersion::V2,
            EncryptedField::V3 { .. } => SchemeVersion::V3,
        }
    }

    /// Render the envelope as the JSON object stored in place of the value.
    pub fn to_value(&self) -> Value {
        let version = self.version();
        let mut envelope = json!({
            "version": version.as_u8(),
            "cipher": version.cipher_name(),
        });
        let (iv, encrypted_data, extra) = match self {
            EncryptedField::V1 { iv, encrypted_data } => (&iv[..], encrypted_data, None),
            EncryptedField::V2 {
                iv,
                encrypted_data,
                hmac,
            } => (&iv[..], encrypted_data, Some(("hmac", &hmac[..]))),
            EncryptedField::V3 {
                iv,
                encrypted_data,
                auth_tag,
            } => (&iv[..], encrypted_data, Some(("auth_tag", &auth_tag[..]))),
        };
        envelope["iv"] = Value::String(STANDARD.encode(iv));
        envelope["encrypted_data"] = Value::String(encrypted_data.clone());
        if let Some((name, bytes)) = extra {
            envelope[name] = Value::String(STANDARD.encode(bytes));
        }
        envelope
    }

    /// Parse an envelope from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::NotCiphertext`] unless `json` is an object with
    /// string `encrypted_data`, `iv` and `cipher` attributes and an integer
    /// `version`. Recognised envelopes with an unknown version, a cipher name
    /// that does not match the version, or undecodable parameters fail with
    /// the corresponding error.
    pub fn from_json(json: &[u8]) -> Result<Self, CipherError> {
        let envelope: Envelope =
            serde_json::from_slice(json).map_err(|_| CipherError::NotCiphertext)?;

        let version = SchemeVersion::try_from(envelope.version)?;
        if envelope.cipher != version.cipher_name() {
            return Err(CipherError::InvalidFormat("cipher"));
        }
        // Validated eagerly so a corrupt envelope fails before any key work.
        decode_b64(&envelope.encrypted_data, "encrypted_data")?;

        let field = match version {
            SchemeVersion::V1 => EncryptedField::V1 {
                iv: decode_fixed(&envelope.iv, "iv")?,
                encrypted_data: envelope.encrypted_data,
            },
            SchemeVersion::V2 => {
                let hmac = envelope.hmac.ok_or(CipherError::InvalidFormat("hmac"))?;
                EncryptedField::V2 {
                    iv: decode_fixed(&envelope.iv, "iv")?,
                    hmac: decode_fixed(&hmac, "hmac")?,
                    encrypted_data: envelope.encrypted_data,
                }
            }
            SchemeVersion::V3 => {
                let tag = envelope
                    .auth_tag
                    .ok_or(CipherError::InvalidFormat("auth_tag"))?;
                EncryptedField::V3 {
                    iv: decode_fixed(&envelope.iv, "iv")?,
                    auth_tag: decode_fixed(&tag, "auth_tag")?,
                    encrypted_data: envelope.encrypted_data,
                }
            }
        };
        Ok(field)
    }

    /// Decrypt this envelope with `secret` and return the wrapped JSON value.
    pub fn decrypt(&self, secret: &[u8]) -> Result<Value, CipherError> {
        let key = derive_key(secret);
        let plaintext = match self {
            EncryptedField::V1 { iv, encrypted_data } => {
                cbc::decrypt(&key[..], iv, &decode_b64(encrypted_data, "encrypted_data")?)?
            }
            EncryptedField::V2 {
                iv,
                encrypted_data,
                hmac,
            } => {
                let mut mac = new_mac(&key[..])?;
                mac.update(encrypted_data.as_bytes());
                mac.verify_slice(hmac)
                    .map_err(|_| CipherError::HmacMismatch)?;
                cbc::decrypt(&key[..], iv, &decode_b64(encrypted_data, "encrypted_data")?)?
            }
            EncryptedField::V3 {
                iv,
                encrypted_data,
                auth_tag,
            } => {
                let mut sealed = decode_b64(encrypted_data, "encrypted_data")?;
                sealed.extend_from_slice(auth_tag);
                let cipher = Aes256Gcm::new_from_slice(&key[..])
                    .map_err(|_| CipherError::InvalidKeyLength)?;
                cipher
                    .decrypt(Nonce::from_slice(iv), sealed.as_ref())
                    .map_err(|_| CipherError::AeadFailure)?
            }
        };

        serde_json::from_slice::<JsonWrapper>(&plaintext)
            .map(|w| w.json_wrapper)
            .map_err(|_| CipherError::InvalidPayload)
    }
}

/// Encrypt a value, given as its JSON text, under `secret` with `version`.
///
/// A fresh random IV or nonce is drawn from the OS CSPRNG on every call, so
/// encrypting the same value twice yields different envelopes.
pub fn encrypt(
    secret: &[u8],
    plaintext_json: &[u8],
    version: SchemeVersion,
) -> Result<EncryptedField, CipherError> {
    let key = derive_key(secret);
    let wrapped = wrap_json(plaintext_json);

    let field = match version {
        SchemeVersion::V1 | SchemeVersion::V2 => {
            let mut iv = [0u8; CBC_IV_LEN];
            OsRng.fill_bytes(&mut iv);
            let encrypted_data = STANDARD.encode(cbc::encrypt(&key[..], &iv, &wrapped)?);
            if version == SchemeVersion::V1 {
                EncryptedField::V1 { iv, encrypted_data }
            } else {
                let mut mac = new_mac(&key[..])?;
                mac.update(encrypted_data.as_bytes());
                EncryptedField::V2 {
                    iv,
                    encrypted_data,
                    hmac: mac.finalize().into_bytes().into(),
                }
            }
        }
        SchemeVersion::V3 => {
            let mut iv = [0u8; GCM_NONCE_LEN];
            OsRng.fill_bytes(&mut iv);
            let cipher =
                Aes256Gcm::new_from_slice(&key[..]).map_err(|_| CipherError::InvalidKeyLength)?;
            let mut sealed = cipher
                .encrypt(Nonce::from_slice(&iv), wrapped.as_ref())
                .map_err(|_| CipherError::AeadFailure)?;
            let tag = sealed.split_off(sealed.len() - GCM_TAG_LEN);
            EncryptedField::V3 {
                iv,
                encrypted_data: STANDARD.encode(&sealed),
                auth_tag: tag.try_into().map_err(|_| CipherError::AeadFailure)?,
            }
        }
    };
    Ok(field)
}

/// Decrypt a value given as the JSON text of a stored envelope.
///
/// # Errors
///
/// Returns [`CipherError::NotCiphertext`] if `ciphertext_json` is not an
/// envelope; any other error means the envelope could not be decrypted.
pub fn decrypt(secret: &[u8], ciphertext_json: &[u8]) -> Result<Value, CipherError> {
    EncryptedField::from_json(ciphertext_json)?.decrypt(secret)
}

fn wrap_json(plaintext_json: &[u8]) -> Vec<u8> {
    const PREFIX: &[u8] = b"{\"json_wrapper\":";
    let mut wrapped = Vec::with_capacity(PREFIX.len() + plaintext_json.len() + 1);
    wrapped.extend_from_slice(PREFIX);
    wrapped.extend_from_slice(plaintext_json);
    wrapped.push(b'}');
    wrapped
}

fn new_mac(key: &[u8]) -> Result<HmacSha256, CipherError> {
    <HmacSha256 as Mac>::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength)
}

/// Base64 attributes written by Ruby tooling carry line breaks every 60 chars.
fn decode_b64(s: &str, attr: &'static str) -> Result<Vec<u8>, CipherError> {
    let compact: String = s.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|_| CipherError::InvalidFormat(attr))
}

fn decode_fixed<const N: usize>(s: &str, attr: &'static str) -> Result<[u8; N], CipherError> {
    decode_b64(s, attr)?
        .try_into()
        .map_err(|_| CipherError::InvalidFormat(attr))
}
