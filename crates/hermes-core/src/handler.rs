//! The handler contract.
//!
//! Middleware and module actions share one trait: both receive the
//! shared Request/Response pair and return a [`Flow`] telling the
//! dispatcher how to continue. This mirrors the wire protocol's view of
//! a chain, where the terminal action is just the last chain member.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::request::Request;
use crate::response::Response;

/// A boxed future, the return type of trait-object handlers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a handler instructs the dispatcher to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Advance to the next chain member. Running past the final member
    /// is a silent no-op; committing the response is the terminal
    /// member's responsibility.
    Continue,
    /// Abort this chain and re-dispatch the call, same identity, under
    /// the given method.
    Forward(String),
    /// A raw command value. The dispatcher honors `{"forward": "..."}`
    /// and rejects anything else as a protocol violation by the
    /// middleware author.
    Command(Value),
}

impl Flow {
    /// Shorthand for [`Flow::Forward`].
    #[must_use]
    pub fn forward(method: impl Into<String>) -> Self {
        Self::Forward(method.into())
    }
}

/// What a handler resolves to. An `Err` is absorbed by the chain runner
/// as the 500 handler-fault error; it never escapes the dispatch.
pub type HandlerResult = Result<Flow, anyhow::Error>;

/// The contract shared by middleware and module actions.
///
/// Handlers receive the shared per-call [`Request`] and [`Response`]
/// and resolve to a [`Flow`]. A handler that answers the call commits
/// the response itself and typically resolves `Flow::Continue` (there
/// is nothing after the terminal member, so continuing is a no-op).
///
/// Closures implement this trait directly:
///
/// ```
/// use std::sync::Arc;
/// use hermes_core::{Flow, Request, Response};
/// use serde_json::json;
///
/// let handler = |_request: Arc<Request>, response: Arc<Response>| async move {
///     response.send(Some(json!("pong")));
///     Ok(Flow::Continue)
/// };
/// # let _: Arc<dyn hermes_core::RpcHandler> = Arc::new(handler);
/// ```
pub trait RpcHandler: Send + Sync + 'static {
    /// Runs the handler against the shared call state.
    fn call(&self, request: Arc<Request>, response: Arc<Response>)
        -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> RpcHandler for F
where
    F: Fn(Arc<Request>, Arc<Response>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(
        &self,
        request: Arc<Request>,
        response: Arc<Response>,
    ) -> BoxFuture<'static, HandlerResult> {
        Box::pin(self(request, response))
    }
}
