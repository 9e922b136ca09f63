//! The outbound response value object.
//!
//! A [`Response`] accumulates errors and commits exactly one output.
//! [`send`](Response::send) is idempotent: the first call builds the
//! wire envelope, stores it, and hands it to the registered observer;
//! later calls are diagnostics-only no-ops.

use std::fmt;
use std::sync::OnceLock;
use std::time::Instant;

use parking_lot::Mutex;
use serde_json::Value;

use crate::envelope::WireResponse;
use crate::error::RpcError;

/// Callback invoked once with the committed envelope. This is how a
/// transport learns the call has completed.
type SendObserver = Box<dyn FnOnce(WireResponse) + Send>;

/// The write-once outcome of one call.
///
/// # Example
///
/// ```
/// use hermes_core::Response;
/// use serde_json::json;
///
/// let response = Response::new(json!(7));
/// response.send(Some(json!(5)));
///
/// let wire = response.sent().expect("committed");
/// assert_eq!(wire.result, Some(json!(5)));
///
/// // A second send never alters the committed output.
/// response.send(Some(json!(99)));
/// assert_eq!(response.sent().expect("committed").result, Some(json!(5)));
/// ```
pub struct Response {
    /// Echoed back in the envelope. A missing or null id falls back to 0.
    id: Value,
    /// Errors in insertion order.
    errors: Mutex<Vec<RpcError>>,
    /// The committed output, set exactly once.
    committed: OnceLock<WireResponse>,
    /// Take-once completion observer.
    observer: Mutex<Option<SendObserver>>,
    /// When this response was created, for the commit latency log.
    started: Instant,
}

impl Response {
    /// Creates a response that will echo the given request id.
    #[must_use]
    pub fn new(id: Value) -> Self {
        let id = if id.is_null() { Value::from(0) } else { id };
        Self {
            id,
            errors: Mutex::new(Vec::new()),
            committed: OnceLock::new(),
            observer: Mutex::new(None),
            started: Instant::now(),
        }
    }

    /// Registers the completion observer.
    ///
    /// The observer fires exactly once, with the committed envelope,
    /// when [`send`](Self::send) first runs.
    #[must_use]
    pub fn on_send(self, observer: impl FnOnce(WireResponse) + Send + 'static) -> Self {
        *self.observer.lock() = Some(Box::new(observer));
        self
    }

    /// Appends an error record. Returns the running error count.
    pub fn add_error(&self, error: RpcError) -> usize {
        let mut errors = self.errors.lock();
        errors.push(error);
        errors.len()
    }

    /// Returns the accumulated errors in insertion order.
    #[must_use]
    pub fn errors(&self) -> Vec<RpcError> {
        self.errors.lock().clone()
    }

    /// Returns true when at least one error has been recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.lock().is_empty()
    }

    /// Returns true once the output has been committed.
    #[must_use]
    pub fn is_sent(&self) -> bool {
        self.committed.get().is_some()
    }

    /// Returns the committed envelope, if any.
    #[must_use]
    pub fn sent(&self) -> Option<WireResponse> {
        self.committed.get().cloned()
    }

    /// Commits the output and notifies the observer.
    ///
    /// With errors recorded, the envelope carries the single error
    /// object, or the synthetic `{code: 400, message: "multiple
    /// errors", data: [...]}` wrapper for two or more, in insertion
    /// order. Without errors it carries `result: payload` (`null` when
    /// no payload is given).
    ///
    /// Idempotent: calls after the first leave the committed output
    /// untouched and are surfaced only as a `warn!` diagnostic.
    pub fn send(&self, payload: Option<Value>) {
        let wire = self.build_output(payload);

        if self.committed.set(wire.clone()).is_err() {
            tracing::warn!("response already sent");
            return;
        }

        tracing::debug!(
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            success = wire.is_success(),
            "rpc response committed"
        );

        if let Some(observer) = self.observer.lock().take() {
            observer(wire);
        }
    }

    fn build_output(&self, payload: Option<Value>) -> WireResponse {
        let mut errors = self.errors.lock().clone();
        match errors.len() {
            0 => WireResponse::success(self.id.clone(), payload.unwrap_or(Value::Null)),
            1 => WireResponse::failure(self.id.clone(), errors.remove(0)),
            _ => {
                let data = serde_json::to_value(&errors).unwrap_or(Value::Null);
                WireResponse::failure(
                    self.id.clone(),
                    RpcError::new(400, "multiple errors").with_data(data),
                )
            }
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("id", &self.id)
            .field("errors", &self.errors.lock().len())
            .field("sent", &self.is_sent())
            .finish()
    }
}
