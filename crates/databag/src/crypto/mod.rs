//! Field-level encryption primitives for data bag items.
//!
//! This module is free of HTTP and store dependencies. It provides the
//! per-value encrypt/decrypt operations used by [`crate::codec`].
//!
//! # Ciphertext format
//!
//! Every encrypted value is a JSON object in the Chef encrypted data bag
//! item format:
//!
//! ```text
//! {"encrypted_data": <b64>, "iv": <b64>, "version": 1|2|3, "cipher": <name>,
//!  "hmac": <b64>      (version 2 only),
//!  "auth_tag": <b64>  (version 3 only)}
//! ```
//!
//! The AES-256 key is `SHA-256(secret)`. The encrypted plaintext is the JSON
//! text `{"json_wrapper": <value>}`.

pub mod cbc;
pub mod cipher;
pub mod version;

pub use cipher::{decrypt, encrypt, CipherError, EncryptedField};
pub use version::SchemeVersion;

use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Derive the AES-256 key for `secret`.
pub fn derive_key(secret: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    Zeroizing::new(Sha256::digest(secret).into())
}

/// Shared secret supplied by the caller.
///
/// The bytes are overwritten with zeroes when the value is dropped and are
/// never printed, not even by `Debug`.
#[derive(Clone, Default)]
pub struct Secret(Vec<u8>);

impl Secret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// An empty secret disables encryption and decryption.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}
