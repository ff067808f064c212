//! AES-256-GCM encryption and decryption of individual leaf values.
//!
//! **Envelope layout:** `nonce (12) || tag (16) || ciphertext`, base64-encoded
//! with the standard alphabet. This layout is a wire contract with previously
//! stored data — the segments must not be reordered.
//!
//! A fresh random nonce is generated per `seal` call from the OS CSPRNG. It is
//! never derived from the plaintext or a counter, and there is no fallback to
//! a weaker random source.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use crate::key::Key;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Errors produced by the cipher layer.
///
/// During tree decryption all of these are recovered per leaf; during
/// encryption any of them aborts the whole transform.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The envelope text is not valid base64.
    #[error("invalid base64 envelope")]
    BadEncoding,

    /// The decoded envelope is shorter than `nonce + tag`.
    #[error("envelope too short: expected at least {} bytes", NONCE_LEN + TAG_LEN)]
    Truncated,

    /// Authentication or decryption failed. Deliberately a single kind:
    /// callers must not be able to distinguish a bad tag from any other
    /// decryption failure.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The OS random source failed while drawing a nonce.
    #[error("OS random source unavailable")]
    RandomUnavailable,
}

/// A parsed encrypted leaf: the three fixed-offset envelope segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Raw nonce bytes.
    pub nonce: [u8; NONCE_LEN],
    /// Raw authentication tag bytes.
    pub tag: [u8; TAG_LEN],
    /// Raw ciphertext bytes (may be empty for an empty plaintext).
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Encode this envelope to its canonical base64 string representation.
    pub fn to_base64(&self) -> String {
        let mut bytes = Vec::with_capacity(NONCE_LEN + TAG_LEN + self.ciphertext.len());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.tag);
        bytes.extend_from_slice(&self.ciphertext);
        STANDARD.encode(&bytes)
    }

    /// Decode a base64 envelope string and split it by fixed offsets.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::BadEncoding`] on invalid base64 and
    /// [`CryptoError::Truncated`] when the decoded payload is shorter than
    /// `nonce + tag`. Truncation is a decode error, not an authentication
    /// failure.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|_| CryptoError::BadEncoding)?;
        if bytes.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::Truncated);
        }

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[..NONCE_LEN]);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[NONCE_LEN..NONCE_LEN + TAG_LEN]);
        let ciphertext = bytes[NONCE_LEN + TAG_LEN..].to_vec();

        Ok(Self {
            nonce,
            tag,
            ciphertext,
        })
    }
}

/// Encrypt plaintext bytes under `key` with a fresh random nonce.
///
/// # Errors
///
/// Returns [`CryptoError::RandomUnavailable`] if the OS CSPRNG fails and
/// [`CryptoError::AuthenticationFailed`] on an internal AEAD error (should be
/// unreachable with a valid key and nonce).
pub fn seal(key: &Key, plaintext: &[u8]) -> Result<Envelope, CryptoError> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    use aes_gcm::aead::rand_core::RngCore;
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce_bytes)
        .map_err(|_| CryptoError::RandomUnavailable)?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    // The aead API appends the tag to the ciphertext; the envelope layout
    // carries the tag up front, so split it back out.
    let mut combined = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::AuthenticationFailed)?;
    let tag_offset = combined.len() - TAG_LEN;
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&combined[tag_offset..]);
    combined.truncate(tag_offset);

    Ok(Envelope {
        nonce: nonce_bytes,
        tag,
        ciphertext: combined,
    })
}

/// Decode a base64 envelope and decrypt it back to plaintext bytes.
///
/// # Errors
///
/// Returns [`CryptoError::BadEncoding`] / [`CryptoError::Truncated`] when the
/// envelope cannot be decoded, and [`CryptoError::AuthenticationFailed`] when
/// the tag does not verify (wrong key or tampered data).
pub fn open(key: &Key, envelope_text: &str) -> Result<Vec<u8>, CryptoError> {
    let envelope = Envelope::from_base64(envelope_text)?;
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let nonce = Nonce::from_slice(&envelope.nonce);

    let mut combined = envelope.ciphertext;
    combined.extend_from_slice(&envelope.tag);

    cipher
        .decrypt(nonce, combined.as_ref())
        .map_err(|_| CryptoError::AuthenticationFailed)
}
