//! The inbound request value object.
//!
//! A [`Request`] carries one call's envelope, the opaque transport
//! context, and the authenticated agent. Transports create one per
//! inbound message; the dispatcher and every chain member share it.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde_json::Value;

/// One inbound call's envelope and identity.
///
/// The payload is the decoded JSON-RPC envelope as delivered by the
/// transport. It is opaque to this type; the dispatcher validates it
/// against the envelope schema before anything downstream reads it.
///
/// The agent is write-once: the first [`set_agent`](Self::set_agent)
/// flips [`has_agent`](Self::has_agent) permanently true, which is how
/// forwarded calls avoid re-authenticating.
///
/// # Example
///
/// ```
/// use hermes_core::Request;
/// use serde_json::json;
///
/// let request = Request::new(
///     json!({"jsonrpc": "2.0", "id": 7, "method": "math.add", "params": {"a": 2, "b": 3}}),
///     None,
/// );
///
/// assert_eq!(request.method().as_deref(), Some("math.add"));
/// assert_eq!(request.id(), json!(7));
/// assert!(!request.has_agent());
/// ```
pub struct Request {
    /// The decoded envelope. Mutable only for the forward method swap.
    payload: RwLock<Value>,
    /// Opaque transport-specific handle (raw connection info and the like).
    context: Option<Arc<dyn Any + Send + Sync>>,
    /// The authenticated identity, any JSON value including `null`.
    agent: OnceLock<Value>,
}

impl Request {
    /// Creates a request from a decoded payload and an optional
    /// transport context.
    #[must_use]
    pub fn new(payload: Value, context: Option<Arc<dyn Any + Send + Sync>>) -> Self {
        Self {
            payload: RwLock::new(payload),
            context,
            agent: OnceLock::new(),
        }
    }

    /// Returns a snapshot of the envelope.
    #[must_use]
    pub fn payload(&self) -> Value {
        self.payload.read().clone()
    }

    /// Returns the `method` field, when present and a string.
    #[must_use]
    pub fn method(&self) -> Option<String> {
        self.payload
            .read()
            .get("method")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
    }

    /// Returns the `id` field, `null` when absent.
    #[must_use]
    pub fn id(&self) -> Value {
        self.payload
            .read()
            .get("id")
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Returns the `params` field, `null` when absent.
    #[must_use]
    pub fn params(&self) -> Value {
        self.payload
            .read()
            .get("params")
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Returns the `jsonrpc` field, when present and a string.
    #[must_use]
    pub fn version(&self) -> Option<String> {
        self.payload
            .read()
            .get("jsonrpc")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
    }

    /// Replaces the envelope `method`.
    ///
    /// Used by the dispatcher when a forward re-targets the call. Has no
    /// effect on a payload that is not an object; a forward is only
    /// reachable after envelope validation, which guarantees one.
    pub fn set_method(&self, method: &str) {
        if let Some(object) = self.payload.write().as_object_mut() {
            object.insert("method".to_owned(), Value::String(method.to_owned()));
        }
    }

    /// Returns the opaque transport context, if the transport supplied one.
    #[must_use]
    pub fn context(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.context.clone()
    }

    /// Downcasts the transport context to a concrete type.
    #[must_use]
    pub fn context_as<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.context
            .as_ref()
            .and_then(|ctx| Arc::clone(ctx).downcast::<T>().ok())
    }

    /// Returns true once an agent has been recorded, even a `null` one.
    #[must_use]
    pub fn has_agent(&self) -> bool {
        self.agent.get().is_some()
    }

    /// Records the authenticated agent.
    ///
    /// The agent is write-once. Returns false and leaves the recorded
    /// value untouched when an agent was already set; callers must not
    /// re-authenticate an already-authenticated request.
    pub fn set_agent(&self, agent: Value) -> bool {
        let set = self.agent.set(agent).is_ok();
        if !set {
            tracing::debug!("agent already recorded for this request");
        }
        set
    }

    /// Returns the recorded agent, `None` until authentication ran.
    #[must_use]
    pub fn agent(&self) -> Option<&Value> {
        self.agent.get()
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("payload", &*self.payload.read())
            .field("has_agent", &self.has_agent())
            .field("has_context", &self.context.is_some())
            .finish()
    }
}
