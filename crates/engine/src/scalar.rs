//! Leaf value normalisation: scalar ↔ bytes around the cipher layer.
//!
//! String scalars are encoded as their raw UTF-8 bytes; every other scalar
//! (number, boolean, null) is serialised to canonical JSON text first.
//! Decoding reverses this with a best-effort JSON parse.
//!
//! # Known limitation
//!
//! Decoding is heuristic and lossy on ambiguity: a plaintext *string* whose
//! content is itself a valid JSON literal (`"42"`, `"true"`, `"null"`) is
//! reinterpreted as that type after a round trip. This matches the behaviour
//! of previously stored data; exact type fidelity would require tagging each
//! leaf's original type alongside its ciphertext.

use serde_json::Value;

/// Encode a scalar leaf to the bytes handed to the cipher.
///
/// Callers must not pass containers; the tree walker recurses into those
/// before reaching this function. A container passed anyway is serialised as
/// JSON, which keeps encoding total.
pub fn encode(leaf: &Value) -> Vec<u8> {
    match leaf {
        Value::String(s) => s.as_bytes().to_vec(),
        other => other.to_string().into_bytes(),
    }
}

/// Reconstruct a typed scalar from decrypted plaintext bytes.
///
/// Attempts a JSON parse first; when that fails the bytes are returned as a
/// string scalar verbatim (lossy UTF-8 conversion as the last resort — in
/// practice the bytes came from [`encode`] and are valid UTF-8).
pub fn decode(bytes: &[u8]) -> Value {
    if let Ok(parsed) = serde_json::from_slice::<Value>(bytes) {
        return parsed;
    }
    Value::String(String::from_utf8_lossy(bytes).into_owned())
}
