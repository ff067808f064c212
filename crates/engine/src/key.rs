//! Symmetric key provisioning: load, validate, and hold the 32-byte key.
//!
//! The key is sourced from a single environment variable holding the base64
//! encoding of exactly 32 raw bytes. It is either fully valid or the calling
//! operation fails before any cryptographic work begins — no partial-key
//! states exist.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use crate::crypto::KEY_LEN;

/// Environment variable holding the base64-encoded 32-byte encryption key.
pub const CRYPT_KEY_ENV: &str = "PORTADATA_CRYPT_KEY";

/// Errors produced while provisioning the encryption key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The key source is absent or empty.
    #[error("{CRYPT_KEY_ENV} environment variable not set")]
    Missing,

    /// The key source is not valid base64 of exactly [`KEY_LEN`] bytes.
    #[error("{CRYPT_KEY_ENV} must be a valid base64-encoded {KEY_LEN}-byte key")]
    InvalidEncoding,
}

/// Fixed-size buffer holding exactly [`KEY_LEN`] bytes of key material.
///
/// When this type is dropped, the memory is overwritten with zeroes to
/// minimise the window during which plaintext key material lives in RAM.
#[derive(Clone)]
pub struct Key(Box<[u8; KEY_LEN]>);

impl Key {
    /// Wrap raw key bytes. Callers must have validated the length already;
    /// the array type enforces it.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Box::new(bytes))
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        // Zero the key material on drop.
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("Key([REDACTED])")
    }
}

/// Load and validate the encryption key from [`CRYPT_KEY_ENV`].
///
/// # Errors
///
/// Returns [`KeyError::Missing`] when the variable is unset or empty, and
/// [`KeyError::InvalidEncoding`] when it is not base64 of exactly
/// [`KEY_LEN`] bytes.
pub fn load_key() -> Result<Key, KeyError> {
    parse_key(std::env::var(CRYPT_KEY_ENV).ok().as_deref())
}

/// Validate a raw key source value. Split out from [`load_key`] so the
/// validation rules are testable without touching process environment.
fn parse_key(raw: Option<&str>) -> Result<Key, KeyError> {
    let raw = match raw {
        Some(s) if !s.is_empty() => s,
        _ => return Err(KeyError::Missing),
    };

    let decoded = STANDARD.decode(raw).map_err(|_| KeyError::InvalidEncoding)?;
    let bytes: [u8; KEY_LEN] = decoded
        .try_into()
        .map_err(|_| KeyError::InvalidEncoding)?;
    Ok(Key::from_bytes(bytes))
}

/// Produce a fresh random 32-byte key, base64-encoded, for first-time setup.
///
/// Returns `None` when [`CRYPT_KEY_ENV`] is already set and non-empty — an
/// existing secret is never overwritten, even one that fails validation — or
/// when the OS random source is unavailable.
pub fn generate_key() -> Option<String> {
    match std::env::var(CRYPT_KEY_ENV) {
        Ok(existing) if !existing.is_empty() => return None,
        _ => {}
    }

    use aes_gcm::aead::rand_core::RngCore;
    let mut bytes = [0u8; KEY_LEN];
    if aes_gcm::aead::OsRng.try_fill_bytes(&mut bytes).is_err() {
        tracing::warn!("OS random source unavailable; cannot generate key");
        return None;
    }
    Some(STANDARD.encode(bytes))
}
