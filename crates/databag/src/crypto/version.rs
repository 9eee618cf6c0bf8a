//! [`SchemeVersion`]: which envelope format a value is encrypted with.

use std::fmt;

use super::cipher::CipherError;

/// Encryption scheme version.
///
/// Every version stays decryptable; new encryptions default to
/// [`SchemeVersion::LATEST`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeVersion {
    /// AES-256-CBC, unauthenticated.
    V1 = 1,
    /// AES-256-CBC with an HMAC-SHA256 over the ciphertext.
    V2 = 2,
    /// AES-256-GCM.
    V3 = 3,
}

impl SchemeVersion {
    pub const LATEST: SchemeVersion = SchemeVersion::V3;

    pub const ALL: [SchemeVersion; 3] = [SchemeVersion::V1, SchemeVersion::V2, SchemeVersion::V3];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Value of the envelope's `cipher` attribute for this version.
    pub fn cipher_name(self) -> &'static str {
        match self {
            SchemeVersion::V1 | SchemeVersion::V2 => "aes-256-cbc",
            SchemeVersion::V3 => "aes-256-gcm",
        }
    }
}

impl Default for SchemeVersion {
    fn default() -> Self {
        Self::LATEST
    }
}

impl TryFrom<i64> for SchemeVersion {
    type Error = CipherError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SchemeVersion::V1),
            2 => Ok(SchemeVersion::V2),
            3 => Ok(SchemeVersion::V3),
            other => Err(CipherError::UnsupportedVersion(other)),
        }
    }
}

impl fmt::Display for SchemeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}
