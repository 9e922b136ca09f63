//! The transport capability contract.
//!
//! Transports own the wire: they decode inbound messages into
//! Request/Response pairs and learn of completion through the
//! response's send observer. The dispatcher consumes calls, never
//! bytes.

use std::any::Any;
use std::sync::Arc;

use hermes_core::{BoxFuture, Request, Response};
use serde_json::Value;

use crate::error::TransportError;

/// One inbound call: the shared Request/Response pair a transport
/// emits per message.
#[derive(Debug, Clone)]
pub struct RpcCall {
    /// The decoded request.
    pub request: Arc<Request>,
    /// The response the call will commit into.
    pub response: Arc<Response>,
}

impl RpcCall {
    /// Pairs a request with its response.
    #[must_use]
    pub fn new(request: Arc<Request>, response: Arc<Response>) -> Self {
        Self { request, response }
    }
}

/// The dispatch callback a transport emits calls through.
pub type RpcSink = Arc<dyn Fn(RpcCall) + Send + Sync>;

/// The contract a transport supplies to the dispatcher.
///
/// Implementations emit exactly one [`RpcCall`] per inbound message
/// through the sink registered via [`on_rpc`](Self::on_rpc). The
/// lifecycle hooks are invoked by the surrounding application (fanned
/// out through the dispatcher), never during dispatch.
pub trait Transport: Send + Sync + 'static {
    /// A short name for logs and lifecycle errors.
    fn name(&self) -> &'static str;

    /// Registers the dispatch sink. The dispatcher calls this exactly
    /// once per transport instance.
    fn on_rpc(&self, sink: RpcSink);

    /// Authenticates a call from its transport context.
    ///
    /// Always completes. The resolved value is recorded as the
    /// request's agent; `null` means anonymous and is not a failure.
    fn authenticate(
        &self,
        context: Option<Arc<dyn Any + Send + Sync>>,
    ) -> BoxFuture<'static, Value>;

    /// Brings the transport up.
    fn init(&self) -> BoxFuture<'static, Result<(), TransportError>>;

    /// Takes the transport down.
    fn teardown(&self) -> BoxFuture<'static, Result<(), TransportError>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_shares_state() {
        let request = Arc::new(Request::new(
            json!({"jsonrpc": "2.0", "id": 1, "method": "a.b", "params": null}),
            None,
        ));
        let response = Arc::new(Response::new(request.id()));
        let call = RpcCall::new(Arc::clone(&request), Arc::clone(&response));

        let cloned = call.clone();
        cloned.request.set_agent(json!("agent-1"));
        assert!(call.request.has_agent());
    }
}
