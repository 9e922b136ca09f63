//! The in-process transport.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::FutureExt;
use hermes_core::{BoxFuture, Request, Response, WireResponse};
use hermes_dispatch::{RpcCall, RpcSink, Transport, TransportError};
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::LocalTransportError;

/// Resolves a transport context to an agent value. `null` means
/// anonymous.
pub type AuthenticateFn =
    Arc<dyn Fn(Option<Arc<dyn Any + Send + Sync>>) -> BoxFuture<'static, Value> + Send + Sync>;

/// Rewrites the committed envelope before it reaches the local caller.
pub type BeforeSendFn = Arc<dyn Fn(WireResponse) -> WireResponse + Send + Sync>;

/// An in-process transport.
///
/// One [`call`](Self::call) produces one Request/Response pair, emits
/// it through the registered dispatch sink, and resolves with the
/// committed envelope.
///
/// # Example
///
/// ```no_run
/// use hermes_dispatch::Dispatcher;
/// use hermes_registry::ModuleRegistry;
/// use hermes_transport_local::LocalTransport;
/// use serde_json::json;
///
/// # async fn example() -> anyhow::Result<()> {
/// let transport = LocalTransport::builder().build();
/// let dispatcher = Dispatcher::builder(ModuleRegistry::new()).build();
/// dispatcher.add_transport(transport.clone());
/// dispatcher.init().await?;
///
/// let reply = transport
///     .call(
///         json!({"jsonrpc": "2.0", "id": 1, "method": "math.add", "params": {"a": 2, "b": 3}}),
///         None,
///     )
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct LocalTransport {
    authenticate: Option<AuthenticateFn>,
    before_send: Option<BeforeSendFn>,
    sink: Mutex<Option<RpcSink>>,
    initialized: AtomicBool,
}

impl LocalTransport {
    /// Starts building a local transport.
    #[must_use]
    pub fn builder() -> LocalTransportBuilder {
        LocalTransportBuilder::default()
    }

    /// Submits one decoded payload and awaits the committed envelope.
    ///
    /// Refused before [`init`](Transport::init) and until a dispatcher
    /// has registered its sink.
    pub async fn call(
        &self,
        payload: Value,
        context: Option<Arc<dyn Any + Send + Sync>>,
    ) -> Result<WireResponse, LocalTransportError> {
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(LocalTransportError::NotInitialized);
        }
        let sink = self
            .sink
            .lock()
            .clone()
            .ok_or(LocalTransportError::NotBound)?;

        let request = Arc::new(Request::new(payload, context));
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();

        let before_send = self.before_send.clone();
        let response = Arc::new(Response::new(request.id()).on_send(move |wire| {
            let wire = match before_send {
                Some(hook) => hook(wire),
                None => wire,
            };
            let _ = reply_tx.send(wire);
        }));

        sink(RpcCall::new(request, response));
        reply_rx
            .await
            .map_err(|_| LocalTransportError::Abandoned)
    }

    /// Returns true while the transport accepts calls.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }
}

impl Transport for LocalTransport {
    fn name(&self) -> &'static str {
        "local"
    }

    fn on_rpc(&self, sink: RpcSink) {
        *self.sink.lock() = Some(sink);
    }

    fn authenticate(
        &self,
        context: Option<Arc<dyn Any + Send + Sync>>,
    ) -> BoxFuture<'static, Value> {
        let Some(hook) = self.authenticate.clone() else {
            return Box::pin(async { Value::Null });
        };

        Box::pin(async move {
            match AssertUnwindSafe(hook(context)).catch_unwind().await {
                Ok(agent) => agent,
                Err(_) => {
                    // A broken callback means anonymous, not a failure.
                    tracing::warn!("authenticate callback panicked");
                    Value::Null
                }
            }
        })
    }

    fn init(&self) -> BoxFuture<'static, Result<(), TransportError>> {
        self.initialized.store(true, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }

    fn teardown(&self) -> BoxFuture<'static, Result<(), TransportError>> {
        self.initialized.store(false, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }
}

impl fmt::Debug for LocalTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTransport")
            .field("initialized", &self.is_initialized())
            .field("bound", &self.sink.lock().is_some())
            .finish()
    }
}

/// Builder for a [`LocalTransport`].
#[derive(Default)]
pub struct LocalTransportBuilder {
    authenticate: Option<AuthenticateFn>,
    before_send: Option<BeforeSendFn>,
}

impl LocalTransportBuilder {
    /// Sets the authenticate callback. Without one every caller is
    /// anonymous.
    #[must_use]
    pub fn authenticate<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Option<Arc<dyn Any + Send + Sync>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        self.authenticate = Some(Arc::new(move |context| Box::pin(hook(context))));
        self
    }

    /// Sets the hook that rewrites committed envelopes before they
    /// reach the local caller.
    #[must_use]
    pub fn before_send(
        mut self,
        hook: impl Fn(WireResponse) -> WireResponse + Send + Sync + 'static,
    ) -> Self {
        self.before_send = Some(Arc::new(hook));
        self
    }

    /// Builds the transport.
    #[must_use]
    pub fn build(self) -> Arc<LocalTransport> {
        Arc::new(LocalTransport {
            authenticate: self.authenticate,
            before_send: self.before_send,
            sink: Mutex::new(None),
            initialized: AtomicBool::new(false),
        })
    }
}

impl fmt::Debug for LocalTransportBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTransportBuilder")
            .field("has_authenticate", &self.authenticate.is_some())
            .field("has_before_send", &self.before_send.is_some())
            .finish()
    }
}
