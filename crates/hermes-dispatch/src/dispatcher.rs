//! The dispatcher: pipeline orchestration and transport registration.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures_util::future::try_join_all;
use futures_util::FutureExt;
use hermes_core::{validate_request_envelope, BoxFuture, Request, RpcError, RpcHandler};
use hermes_registry::{CacheEntry, MethodDescriptor, ModuleCache, ModuleRegistry};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::Instrument;

use crate::chain::{run_chain, ChainOutcome};
use crate::error::TransportError;
use crate::transport::{RpcCall, Transport};

/// The configured authorization predicate.
///
/// Receives the shared request (agent included) and resolves whether
/// the call may proceed. An `Err` or a panic never authorizes.
pub type AuthorizeFn =
    Arc<dyn Fn(Arc<Request>) -> BoxFuture<'static, Result<bool, anyhow::Error>> + Send + Sync>;

/// How one pipeline attempt ended.
enum Attempt {
    /// The chain ran to its end; completion belongs to the chain.
    Completed,
    /// Re-dispatch under a new method, same identity.
    Forwarded(String),
    /// Commit this error and stop.
    Failed(RpcError),
    /// No valid response sink exists; stop without sending.
    Halted,
}

/// Routes calls from registered transports through the dispatch
/// pipeline to registered modules.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use hermes_core::{Flow, Request, Response};
/// use hermes_dispatch::Dispatcher;
/// use hermes_registry::{Module, ModuleRegistry};
/// use serde_json::json;
///
/// let mut registry = ModuleRegistry::new();
/// registry.register(
///     "math",
///     Module::new().action("add", |req: Arc<Request>, res: Arc<Response>| async move {
///         let params = req.params();
///         let sum = params["a"].as_i64().unwrap_or(0) + params["b"].as_i64().unwrap_or(0);
///         res.send(Some(json!(sum)));
///         Ok(Flow::Continue)
///     }),
/// );
///
/// let dispatcher = Dispatcher::builder(registry)
///     .authorize(|req: Arc<Request>| async move { Ok(req.agent().is_some()) })
///     .build();
/// # let _ = dispatcher;
/// ```
pub struct Dispatcher {
    registry: ModuleRegistry,
    cache: ModuleCache,
    middleware: Vec<Arc<dyn RpcHandler>>,
    authorize: Option<AuthorizeFn>,
    transports: Mutex<Vec<Arc<dyn Transport>>>,
    /// Numbers every attempt; forwarded attempts compose `"new.old"`.
    sequence: AtomicU64,
    /// Lets the per-transport sink spawn dispatch tasks back into this
    /// instance without keeping it alive.
    self_ref: Weak<Dispatcher>,
}

impl Dispatcher {
    /// Starts building a dispatcher over a module registry.
    #[must_use]
    pub fn builder(registry: ModuleRegistry) -> DispatcherBuilder {
        DispatcherBuilder {
            registry,
            middleware: Vec::new(),
            authorize: None,
        }
    }

    /// Registers a transport and subscribes to its calls.
    ///
    /// A transport instance is registered at most once; repeated
    /// registrations are no-ops. Returns true when the transport was
    /// newly registered.
    pub fn add_transport(&self, transport: Arc<dyn Transport>) -> bool {
        {
            let mut transports = self.transports.lock();
            if transports
                .iter()
                .any(|existing| Arc::ptr_eq(existing, &transport))
            {
                return false;
            }
            transports.push(Arc::clone(&transport));
        }

        let dispatcher = self.self_ref.clone();
        let origin = Arc::clone(&transport);
        transport.on_rpc(Arc::new(move |call| {
            let Some(dispatcher) = dispatcher.upgrade() else {
                return;
            };
            let origin = Arc::clone(&origin);
            tokio::spawn(async move {
                dispatcher.dispatch(&origin, call).await;
            });
        }));

        tracing::debug!(transport = transport.name(), "transport registered");
        true
    }

    /// Returns the number of registered transports.
    #[must_use]
    pub fn transport_count(&self) -> usize {
        self.transports.lock().len()
    }

    /// Initializes every registered transport.
    ///
    /// Invoked by the surrounding application, never during dispatch.
    pub async fn init(&self) -> Result<(), TransportError> {
        let transports: Vec<_> = self.transports.lock().clone();
        try_join_all(transports.iter().map(|transport| transport.init())).await?;
        Ok(())
    }

    /// Tears down every registered transport.
    pub async fn teardown(&self) -> Result<(), TransportError> {
        let transports: Vec<_> = self.transports.lock().clone();
        try_join_all(transports.iter().map(|transport| transport.teardown())).await?;
        Ok(())
    }

    /// Dispatches one call through the pipeline.
    ///
    /// Runs attempts until one completes, fails, or halts. A forward
    /// swaps the method on the shared request and loops, which keeps
    /// re-dispatch depth bounded regardless of how many times the call
    /// is forwarded.
    pub async fn dispatch(&self, transport: &Arc<dyn Transport>, call: RpcCall) {
        let mut number = String::new();
        loop {
            let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
            number = if number.is_empty() {
                sequence.to_string()
            } else {
                format!("{sequence}.{number}")
            };

            let span = tracing::debug_span!("rpc", request = %number);
            match self.run_attempt(transport, &call).instrument(span).await {
                Attempt::Completed | Attempt::Halted => break,
                Attempt::Forwarded(method) => {
                    call.request.set_method(&method);
                }
                Attempt::Failed(error) => {
                    call.response.add_error(error);
                    call.response.send(None);
                    break;
                }
            }
        }
    }

    /// One pass over the pipeline stages, strictly in order, first
    /// failure wins.
    async fn run_attempt(&self, transport: &Arc<dyn Transport>, call: &RpcCall) -> Attempt {
        // A response that is already committed has no valid sink, so
        // the failure can only be reported diagnostically.
        if call.response.is_sent() {
            tracing::error!("transport supplied an already committed response");
            return Attempt::Halted;
        }

        tracing::debug!(payload = %call.request.payload(), "rpc request");

        if let Err(error) = validate_request_envelope(&call.request.payload()) {
            return Attempt::Failed(error);
        }

        // Forwarded calls already carry an agent and must not
        // re-authenticate.
        if !call.request.has_agent() {
            let agent = transport.authenticate(call.request.context()).await;
            call.request.set_agent(agent);
        }

        // Envelope validation guarantees a non-empty string method.
        let method = call.request.method().unwrap_or_default();

        if !self.authorized(call).await {
            return Attempt::Failed(
                RpcError::new(401, "not authorized for specified method")
                    .with_data(Value::String(method)),
            );
        }

        let descriptor = MethodDescriptor::parse(&method);

        let module = match self.cache.load(&self.registry, &descriptor.module) {
            CacheEntry::Loaded(module) => module,
            CacheEntry::NotFound => {
                return Attempt::Failed(RpcError::new(404, "module not found"));
            }
            CacheEntry::LoadError(detail) => {
                return Attempt::Failed(
                    RpcError::new(500, "module failed to load").with_data(Value::String(detail)),
                );
            }
        };

        let Some(action) = module.get(&descriptor.action) else {
            return Attempt::Failed(RpcError::new(404, "method action not found"));
        };

        let mut handlers: Vec<Arc<dyn RpcHandler>> = Vec::with_capacity(self.middleware.len() + 1);
        handlers.extend(self.middleware.iter().map(Arc::clone));
        handlers.push(action);

        match run_chain(&handlers, &call.request, &call.response).await {
            ChainOutcome::Completed => Attempt::Completed,
            ChainOutcome::Forwarded(method) => Attempt::Forwarded(method),
            ChainOutcome::Failed(error) => Attempt::Failed(error),
        }
    }

    /// Runs the configured predicate; absent means authorized.
    async fn authorized(&self, call: &RpcCall) -> bool {
        let Some(predicate) = &self.authorize else {
            return true;
        };

        let future = predicate(Arc::clone(&call.request));
        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(error)) => {
                // Fail closed: a broken predicate never authorizes.
                tracing::warn!(%error, "authorization predicate failed");
                false
            }
            Err(_) => {
                tracing::warn!("authorization predicate panicked");
                false
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("middleware", &self.middleware.len())
            .field("transports", &self.transport_count())
            .finish()
    }
}

/// Builder for a [`Dispatcher`].
///
/// The registry is the one required input; middleware and the
/// authorization predicate are optional.
pub struct DispatcherBuilder {
    registry: ModuleRegistry,
    middleware: Vec<Arc<dyn RpcHandler>>,
    authorize: Option<AuthorizeFn>,
}

impl DispatcherBuilder {
    /// Appends a middleware handler. Middleware runs per call, in
    /// registration order, ahead of the resolved action.
    #[must_use]
    pub fn middleware(mut self, handler: impl RpcHandler) -> Self {
        self.middleware.push(Arc::new(handler));
        self
    }

    /// Sets the authorization predicate. Without one, every call is
    /// authorized.
    #[must_use]
    pub fn authorize<F, Fut>(mut self, predicate: F) -> Self
    where
        F: Fn(Arc<Request>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, anyhow::Error>> + Send + 'static,
    {
        self.authorize = Some(Arc::new(move |request| Box::pin(predicate(request))));
        self
    }

    /// Builds the dispatcher.
    #[must_use]
    pub fn build(self) -> Arc<Dispatcher> {
        Arc::new_cyclic(|self_ref| Dispatcher {
            registry: self.registry,
            cache: ModuleCache::new(),
            middleware: self.middleware,
            authorize: self.authorize,
            transports: Mutex::new(Vec::new()),
            sequence: AtomicU64::new(0),
            self_ref: self_ref.clone(),
        })
    }
}

impl std::fmt::Debug for DispatcherBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("registry", &self.registry)
            .field("middleware", &self.middleware.len())
            .field("has_authorize", &self.authorize.is_some())
            .finish()
    }
}
