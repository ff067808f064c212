//! Recursive shape-preserving traversal: encrypt or decrypt every leaf of an
//! arbitrary JSON value tree.
//!
//! Container kind, key order, and nesting are reproduced exactly in the
//! output (`serde_json` is built with `preserve_order`, so object key order
//! survives the walk).
//!
//! Encryption is all-or-nothing: any cipher failure aborts the whole
//! transform so a partially encrypted tree is never returned or transmitted.
//! Decryption is total per leaf: a leaf that fails to authenticate — wrong
//! key, tampering, or a value that was never encrypted — passes through
//! unchanged instead of failing the operation.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::crypto::{self, CryptoError};
use crate::key::Key;
use crate::scalar;

/// Maximum nesting depth accepted before the walk is aborted.
///
/// Guards against stack exhaustion on attacker-influenced input; real
/// payloads sit nowhere near this bound.
pub const MAX_DEPTH: usize = 128;

/// Errors produced while walking a value tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalkError {
    /// A leaf failed to encrypt. Only raised on the encryption path;
    /// decryption recovers cipher failures per leaf.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The tree nests deeper than [`MAX_DEPTH`] levels.
    #[error("tree exceeds maximum nesting depth of {MAX_DEPTH}")]
    DepthExceeded,
}

/// Encrypt every scalar leaf of `value`, preserving the container shape.
///
/// Each leaf becomes a base64 envelope string (see [`crate::crypto`]).
///
/// # Errors
///
/// Returns [`WalkError::DepthExceeded`] for pathologically deep trees and
/// [`WalkError::Crypto`] when any leaf fails to encrypt; in both cases no
/// partial result is produced.
pub fn encrypt_tree(key: &Key, value: &Value) -> Result<Value, WalkError> {
    encrypt_at(key, value, 0)
}

fn encrypt_at(key: &Key, value: &Value, depth: usize) -> Result<Value, WalkError> {
    if depth > MAX_DEPTH {
        return Err(WalkError::DepthExceeded);
    }

    match value {
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), encrypt_at(key, v, depth + 1)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(encrypt_at(key, item, depth + 1)?);
            }
            Ok(Value::Array(out))
        }
        leaf => {
            let envelope = crypto::seal(key, &scalar::encode(leaf))?;
            Ok(Value::String(envelope.to_base64()))
        }
    }
}

/// Decrypt every scalar leaf of `value`, preserving the container shape.
///
/// A bare scalar handed in at top level takes the same leaf path as a nested
/// one. Leaves that fail to open pass through unchanged.
///
/// # Errors
///
/// Returns [`WalkError::DepthExceeded`] for pathologically deep trees; no
/// other failure is possible.
pub fn decrypt_tree(key: &Key, value: &Value) -> Result<Value, WalkError> {
    decrypt_at(key, value, 0)
}

fn decrypt_at(key: &Key, value: &Value, depth: usize) -> Result<Value, WalkError> {
    if depth > MAX_DEPTH {
        return Err(WalkError::DepthExceeded);
    }

    match value {
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), decrypt_at(key, v, depth + 1)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(decrypt_at(key, item, depth + 1)?);
            }
            Ok(Value::Array(out))
        }
        Value::String(text) => match crypto::open(key, text) {
            Ok(plaintext) => Ok(scalar::decode(&plaintext)),
            Err(e) => {
                // Per-leaf fallback: keep the original text untouched.
                debug!(error = %e, "leaf did not decrypt; passing through unchanged");
                Ok(value.clone())
            }
        },
        // Numbers, booleans, and null were never encrypted; pass through.
        leaf => Ok(leaf.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Envelope, KEY_LEN, NONCE_LEN, TAG_LEN};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde_json::json;

    fn test_key() -> Key {
        Key::from_bytes([0u8; KEY_LEN])
    }

    fn assert_ciphertext_leaf(v: &Value) {
        let text = v.as_str().expect("encrypted leaf must be a string");
        let decoded = STANDARD.decode(text).expect("leaf must be base64");
        assert!(decoded.len() >= NONCE_LEN + TAG_LEN);
    }

    #[test]
    fn shape_preserved_for_nested_tree() {
        let key = test_key();
        let input = json!({"a": [1, "x", {"b": true}]});
        let encrypted = encrypt_tree(&key, &input).unwrap();

        let a = encrypted.get("a").expect("key 'a' preserved");
        let items = a.as_array().expect("sequence preserved");
        assert_eq!(items.len(), 3);
        assert_ciphertext_leaf(&items[0]);
        assert_ciphertext_leaf(&items[1]);
        let nested = items[2].as_object().expect("nested mapping preserved");
        assert_eq!(nested.len(), 1);
        assert_ciphertext_leaf(nested.get("b").unwrap());
    }

    #[test]
    fn round_trip_recovers_types_and_order() {
        let key = test_key();
        let input = json!({"name": "alice", "age": 30, "tags": ["x", "y"], "active": true});
        let encrypted = encrypt_tree(&key, &input).unwrap();
        let decrypted = decrypt_tree(&key, &encrypted).unwrap();
        assert_eq!(decrypted, input);

        // Key order must survive, not just set equality.
        let keys: Vec<_> = decrypted.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["name", "age", "tags", "active"]);
    }

    #[test]
    fn end_to_end_zero_key_example() {
        // Key = 32 zero bytes; {"name": "alice", "age": 30} round-trips with
        // age recovered as a number, not text.
        let key = test_key();
        let input = json!({"name": "alice", "age": 30});
        let encrypted = encrypt_tree(&key, &input).unwrap();
        assert_ciphertext_leaf(encrypted.get("name").unwrap());
        assert_ciphertext_leaf(encrypted.get("age").unwrap());

        let decrypted = decrypt_tree(&key, &encrypted).unwrap();
        assert_eq!(decrypted, input);
        assert!(decrypted.get("age").unwrap().is_number());
    }

    #[test]
    fn top_level_scalar_uses_leaf_path() {
        let key = test_key();
        let encrypted = encrypt_tree(&key, &json!("bare")).unwrap();
        assert_ciphertext_leaf(&encrypted);
        assert_eq!(decrypt_tree(&key, &encrypted).unwrap(), json!("bare"));
    }

    #[test]
    fn garbage_leaf_passes_through_unchanged() {
        let key = test_key();
        let input = json!({"name": "alice", "age": 30});
        let mut encrypted = encrypt_tree(&key, &input).unwrap();
        encrypted["age"] = json!("not an envelope");

        let decrypted = decrypt_tree(&key, &encrypted).unwrap();
        assert_eq!(decrypted["name"], "alice");
        assert_eq!(decrypted["age"], "not an envelope");
    }

    #[test]
    fn tampered_leaf_passes_through_as_ciphertext() {
        let key = test_key();
        let encrypted = encrypt_tree(&key, &json!({"v": "secret"})).unwrap();
        let mut envelope = Envelope::from_base64(encrypted["v"].as_str().unwrap()).unwrap();
        envelope.tag[0] ^= 0x01;
        let tampered_text = envelope.to_base64();
        let tampered = json!({"v": tampered_text.clone()});

        let decrypted = decrypt_tree(&key, &tampered).unwrap();
        assert_eq!(decrypted["v"], Value::String(tampered_text));
    }

    #[test]
    fn wrong_key_returns_ciphertext_unchanged() {
        let key = test_key();
        let encrypted = encrypt_tree(&key, &json!({"v": "secret"})).unwrap();
        let other = Key::from_bytes([9u8; KEY_LEN]);
        let decrypted = decrypt_tree(&other, &encrypted).unwrap();
        assert_eq!(decrypted, encrypted);
    }

    #[test]
    fn unencrypted_non_string_leaves_pass_through() {
        let key = test_key();
        let input = json!({"n": 1, "b": false, "z": null});
        assert_eq!(decrypt_tree(&key, &input).unwrap(), input);
    }

    #[test]
    fn empty_containers_preserved() {
        let key = test_key();
        let input = json!({"empty_map": {}, "empty_list": []});
        let encrypted = encrypt_tree(&key, &input).unwrap();
        assert_eq!(encrypted, input);
        assert_eq!(decrypt_tree(&key, &encrypted).unwrap(), input);
    }

    fn deeply_nested(depth: usize) -> Value {
        let mut v = json!(1);
        for _ in 0..depth {
            v = json!([v]);
        }
        v
    }

    #[test]
    fn depth_within_limit_accepted() {
        let key = test_key();
        let input = deeply_nested(MAX_DEPTH);
        let encrypted = encrypt_tree(&key, &input).unwrap();
        assert_eq!(decrypt_tree(&key, &encrypted).unwrap(), input);
    }

    #[test]
    fn excessive_depth_rejected_on_encrypt() {
        let key = test_key();
        let input = deeply_nested(MAX_DEPTH + 10);
        assert_eq!(
            encrypt_tree(&key, &input).unwrap_err(),
            WalkError::DepthExceeded
        );
    }

    #[test]
    fn excessive_depth_rejected_on_decrypt() {
        let key = test_key();
        let input = deeply_nested(MAX_DEPTH + 10);
        assert_eq!(
            decrypt_tree(&key, &input).unwrap_err(),
            WalkError::DepthExceeded
        );
    }
}
