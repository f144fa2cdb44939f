use std::fmt;

use thiserror::Error;
use zeroize::Zeroize;

use crate::rng::{RngError, SecureRandom, random_bytes};

pub const KEY_LEN: usize = 32;
const SIGNING_KEY_LEN: usize = 16;
const ENCRYPTION_KEY_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid key length: expected {KEY_LEN} bytes, got {actual}")]
    InvalidKeyLength { actual: usize },
}

/// Symmetric key pair backing the token codec: a 32-byte secret split into
/// a signing half (bytes 0–15, HMAC) and an encryption half (bytes 16–31,
/// AES-128-CBC).
///
/// Immutable after construction; both halves are zeroized on drop. Key
/// persistence is the caller's concern via [`KeyMaterial::to_bytes`] and
/// [`KeyMaterial::from_bytes`].
#[derive(Clone)]
pub struct KeyMaterial {
    signing_key: [u8; SIGNING_KEY_LEN],
    encryption_key: [u8; ENCRYPTION_KEY_LEN],
}

impl KeyMaterial {
    /// Generate a fresh key from a secure random source.
    pub fn generate(rng: &mut dyn SecureRandom) -> Result<Self, RngError> {
        let mut secret = random_bytes::<KEY_LEN>(rng)?;
        let key = Self::split(&secret);
        secret.zeroize();
        Ok(key)
    }

    /// Reconstruct a key from its exact 32-byte serialized form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != KEY_LEN {
            return Err(KeyError::InvalidKeyLength {
                actual: bytes.len(),
            });
        }

        let mut secret = [0_u8; KEY_LEN];
        secret.copy_from_slice(bytes);
        let key = Self::split(&secret);
        secret.zeroize();
        Ok(key)
    }

    /// Serialize as `signing_key ++ encryption_key`, the exact inverse of
    /// [`KeyMaterial::from_bytes`].
    #[must_use]
    pub fn to_bytes(&self) -> [u8; KEY_LEN] {
        let mut out = [0_u8; KEY_LEN];
        out[..SIGNING_KEY_LEN].copy_from_slice(&self.signing_key);
        out[SIGNING_KEY_LEN..].copy_from_slice(&self.encryption_key);
        out
    }

    pub(crate) fn signing_key(&self) -> &[u8; SIGNING_KEY_LEN] {
        &self.signing_key
    }

    pub(crate) fn encryption_key(&self) -> &[u8; ENCRYPTION_KEY_LEN] {
        &self.encryption_key
    }

    fn split(secret: &[u8; KEY_LEN]) -> Self {
        let mut signing_key = [0_u8; SIGNING_KEY_LEN];
        let mut encryption_key = [0_u8; ENCRYPTION_KEY_LEN];
        signing_key.copy_from_slice(&secret[..SIGNING_KEY_LEN]);
        encryption_key.copy_from_slice(&secret[SIGNING_KEY_LEN..]);
        Self {
            signing_key,
            encryption_key,
        }
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.signing_key.zeroize();
        self.encryption_key.zeroize();
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("KeyMaterial(..)")
    }
}
