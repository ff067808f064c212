//! Wire types exchanged with the remote store, and the uniform outcome record
//! every public operation returns.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform result record returned by every public operation.
///
/// Callers distinguish failure purely by the `success` flag and `error` text;
/// no error type crosses the public boundary. `code` is the remote HTTP
/// status, or `0` when the operation failed before or without reaching the
/// remote (missing key, missing token, transport error).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    /// HTTP status code, or 0 for local failures.
    pub code: u16,
    /// Whether the operation succeeded end to end.
    pub success: bool,
    /// Human-readable error description; empty on success.
    pub error: String,
    /// Returned value (decrypted on read paths); `Null` when none.
    pub value: Value,
}

impl Outcome {
    /// A successful outcome carrying `value`.
    pub fn success(code: u16, value: Value) -> Self {
        Self {
            code,
            success: true,
            error: String::new(),
            value,
        }
    }

    /// A failed outcome carrying an error description.
    pub fn failure(code: u16, error: impl Into<String>) -> Self {
        Self {
            code,
            success: false,
            error: error.into(),
            value: Value::Null,
        }
    }
}

/// Request body for `POST /store`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreRequest {
    /// Record key under which the value is stored.
    pub key: String,
    /// Already-encrypted value tree.
    pub value: Value,
}

/// Request body for `PUT /update`.
///
/// Exactly one of `value` (full replacement) or `attributes` (partial merge)
/// is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Record key to update.
    pub key: String,
    /// Full replacement value, already encrypted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Attribute map to merge into the record, already encrypted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
}

/// Request body for `DELETE /destroy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestroyRequest {
    /// Record key to destroy.
    pub key: String,
    /// When present, only these attributes are removed instead of the whole
    /// record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<String>>,
}

/// Response body shape shared by all remote endpoints.
///
/// Success responses may carry `value`; error responses may carry `error`.
/// Both are optional so a bare `{}` body parses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiBody {
    /// Possibly-encrypted value tree, present on read paths.
    #[serde(default)]
    pub value: Option<Value>,
    /// Error description, present on failures.
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outcome_constructors() {
        let ok = Outcome::success(200, json!({"a": 1}));
        assert!(ok.success);
        assert_eq!(ok.code, 200);
        assert!(ok.error.is_empty());

        let err = Outcome::failure(0, "no key");
        assert!(!err.success);
        assert_eq!(err.code, 0);
        assert_eq!(err.value, Value::Null);
    }

    #[test]
    fn update_request_omits_absent_fields() {
        let req = UpdateRequest {
            key: "user-1".into(),
            value: None,
            attributes: Some(json!({"age": "ciphertext"})),
        };
        let text = serde_json::to_string(&req).unwrap();
        assert!(text.contains("attributes"));
        assert!(!text.contains("\"value\""));
    }

    #[test]
    fn api_body_parses_empty_object() {
        let body: ApiBody = serde_json::from_str("{}").unwrap();
        assert!(body.value.is_none());
        assert!(body.error.is_none());
    }

    #[test]
    fn api_body_parses_value_and_error() {
        let body: ApiBody = serde_json::from_str(r#"{"value": {"a": 1}}"#).unwrap();
        assert_eq!(body.value.unwrap()["a"], 1);

        let body: ApiBody = serde_json::from_str(r#"{"error": "not found"}"#).unwrap();
        assert_eq!(body.error.unwrap(), "not found");
    }
}
