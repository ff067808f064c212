//! `portadata-engine` — structure-preserving authenticated encryption of
//! nested JSON values.
//!
//! The engine walks an arbitrary [`serde_json::Value`] tree and encrypts every
//! scalar leaf independently with AES-256-GCM, preserving container kind,
//! nesting, and key order exactly. Decryption reverses the process, falling
//! back per leaf to the untouched ciphertext text when a leaf does not
//! authenticate (wrong key, tampering, or a value that was never encrypted).
//!
//! # Ciphertext format
//!
//! Every encrypted leaf is a base64 string of:
//!
//! ```text
//! nonce (12 bytes) || tag (16 bytes) || ciphertext (variable)
//! ```
//!
//! The layout is a wire contract shared with previously stored data; do not
//! reorder the segments.
//!
//! # Security invariants
//!
//! - A fresh random nonce is drawn from the OS CSPRNG for every `seal` call.
//! - The plaintext key is never written to disk, logged, or included in traces.
//! - A partially encrypted tree is never returned: any crypto failure during
//!   encryption aborts the whole transform.

pub mod crypto;
pub mod key;
pub mod scalar;
pub mod tree;

pub use crypto::{open, seal, CryptoError, Envelope, KEY_LEN, NONCE_LEN, TAG_LEN};
pub use key::{generate_key, load_key, Key, KeyError, CRYPT_KEY_ENV};
pub use tree::{decrypt_tree, encrypt_tree, WalkError, MAX_DEPTH};
