//! The wire-level error object.
//!
//! Every failure a call can produce travels as an [`RpcError`] with the
//! JSON-RPC `{code, message, data}` shape. The serde defaults normalize
//! loosely-typed error objects on arrival: a missing code becomes 500, a
//! missing message the empty string, missing data `null`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

fn default_code() -> i64 {
    500
}

/// A structured RPC error carried inside a failure envelope.
///
/// # Example
///
/// ```
/// use hermes_core::RpcError;
/// use serde_json::json;
///
/// let error = RpcError::new(404, "module not found");
/// assert_eq!(error.code, 404);
/// assert_eq!(error.data, serde_json::Value::Null);
///
/// let error = RpcError::new(401, "not authorized for specified method")
///     .with_data(json!("math.add"));
/// assert_eq!(error.data, json!("math.add"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("rpc error {code}: {message}")]
pub struct RpcError {
    /// Numeric error code. Defaults to 500 when absent.
    #[serde(default = "default_code")]
    pub code: i64,
    /// Human-readable error message. Defaults to empty when absent.
    #[serde(default)]
    pub message: String,
    /// Arbitrary context for the error. Defaults to `null` when absent.
    #[serde(default)]
    pub data: Value,
}

impl RpcError {
    /// Creates an error with the given code and message and `null` data.
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: Value::Null,
        }
    }

    /// Attaches context data to the error.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

impl Default for RpcError {
    fn default() -> Self {
        Self {
            code: default_code(),
            message: String::new(),
            data: Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_defaults_data_to_null() {
        let error = RpcError::new(400, "bad request");
        assert_eq!(error.code, 400);
        assert_eq!(error.message, "bad request");
        assert_eq!(error.data, Value::Null);
    }

    #[test]
    fn test_serialization_shape() {
        let error = RpcError::new(404, "module not found").with_data(json!(["a", "b"]));
        let value = serde_json::to_value(&error).expect("serialization should work");
        assert_eq!(
            value,
            json!({"code": 404, "message": "module not found", "data": ["a", "b"]})
        );
    }

    #[test]
    fn test_loose_object_normalizes_on_deserialization() {
        // A bare object with none of the fields picks up all defaults.
        let error: RpcError = serde_json::from_str("{}").expect("deserialization should work");
        assert_eq!(error.code, 500);
        assert_eq!(error.message, "");
        assert_eq!(error.data, Value::Null);

        // Partial objects keep what they carry.
        let error: RpcError =
            serde_json::from_value(json!({"message": "boom"})).expect("deserialization");
        assert_eq!(error.code, 500);
        assert_eq!(error.message, "boom");
    }

    #[test]
    fn test_display() {
        let error = RpcError::new(401, "not authorized for specified method");
        assert_eq!(
            error.to_string(),
            "rpc error 401: not authorized for specified method"
        );
    }
}
