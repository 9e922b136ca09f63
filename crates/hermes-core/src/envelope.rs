//! The JSON-RPC 2.0 wire envelope.
//!
//! [`validate_request_envelope`] enforces the inbound subset this
//! framework accepts; [`WireResponse`] is the outbound envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RpcError;

/// The only protocol version this framework speaks.
pub const JSONRPC_VERSION: &str = "2.0";

/// The outbound JSON-RPC envelope, success or failure.
///
/// Exactly one of `result` and `error` is present on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireResponse {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Echo of the request id.
    pub id: Value,
    /// The committed result. Present on success, even when `null`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// The committed error. Present on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl WireResponse {
    /// Builds a success envelope.
    #[must_use]
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Builds a failure envelope.
    #[must_use]
    pub fn failure(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Returns true when the envelope carries a result.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Validates an inbound payload against the envelope schema.
///
/// Checks run in fixed order and the first violation wins: the payload
/// must be an object, must carry `jsonrpc` exactly equal to `"2.0"`,
/// must carry `id`, must carry a non-empty string `method`, and must
/// carry the `params` key (its value may be `null`).
pub fn validate_request_envelope(payload: &Value) -> Result<(), RpcError> {
    let Some(object) = payload.as_object() else {
        return Err(RpcError::new(
            500,
            "internal Error: transport failed to return a payload object",
        )
        .with_data(Value::String(json_type_name(payload).to_owned())));
    };

    let Some(version) = object.get("jsonrpc") else {
        return Err(RpcError::new(400, "required Field: jsonrpc").with_data(payload.clone()));
    };
    if version.as_str() != Some(JSONRPC_VERSION) {
        let shown = version
            .as_str()
            .map_or_else(|| version.to_string(), ToOwned::to_owned);
        return Err(
            RpcError::new(400, format!("unsupported Protocol Version: JSON RPC {shown}"))
                .with_data(version.clone()),
        );
    }

    if !object.contains_key("id") {
        return Err(RpcError::new(400, "required Field: id").with_data(payload.clone()));
    }

    let Some(method) = object.get("method") else {
        return Err(RpcError::new(400, "required Field: method").with_data(payload.clone()));
    };
    if !method.as_str().is_some_and(|m| !m.is_empty()) {
        return Err(
            RpcError::new(400, "required Field: method can not be an empty string")
                .with_data(method.clone()),
        );
    }

    if !object.contains_key("params") {
        return Err(
            RpcError::new(400, "required Field: params must be supplied").with_data(payload.clone()),
        );
    }

    Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
