//! # Hermes
//!
//! **JSON-RPC dispatch framework for the Themis Platform**
//!
//! Hermes routes JSON-RPC 2.0 requests from pluggable transports to
//! handler modules resolved by dotted namespace, applying
//! authentication, authorization, and a configurable middleware chain
//! along the way:
//!
//! ```text
//! Transport ──rpc──▶ validate ▶ authenticate ▶ authorize ▶ resolve ▶ [middleware…, action]
//!                                                                            │
//!                                                 response ◀── send / forward┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hermes::prelude::*;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = ModuleRegistry::new();
//! registry.register(
//!     "math",
//!     Module::new().action("add", |req: Arc<Request>, res: Arc<Response>| async move {
//!         let params = req.params();
//!         let sum = params["a"].as_i64().unwrap_or(0) + params["b"].as_i64().unwrap_or(0);
//!         res.send(Some(json!(sum)));
//!         Ok(Flow::Continue)
//!     }),
//! );
//!
//! let transport = LocalTransport::builder().build();
//! let dispatcher = Dispatcher::builder(registry).build();
//! dispatcher.add_transport(transport.clone());
//! dispatcher.init().await?;
//!
//! let reply = transport
//!     .call(
//!         json!({"jsonrpc": "2.0", "id": 7, "method": "math.add", "params": {"a": 2, "b": 3}}),
//!         None,
//!     )
//!     .await?;
//! assert_eq!(reply.result, Some(json!(5)));
//! # Ok(())
//! # }
//! ```
//!
//! ## Forwarding
//!
//! A middleware or action may resolve `Flow::Forward("other.method")`
//! to re-dispatch the call under a new method. The forwarded run keeps
//! the authenticated agent, re-runs authorization and resolution, and
//! owns the eventual response.

#![doc(html_root_url = "https://docs.rs/hermes/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core protocol types
pub use hermes_core as core;

// Re-export method resolution types
pub use hermes_registry as registry;

// Re-export the dispatcher
pub use hermes_dispatch as dispatch;

// Re-export the in-process transport
pub use hermes_transport_local as transport_local;

pub mod logging;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use hermes::prelude::*;
/// ```
pub mod prelude {
    pub use hermes_core::{
        Flow, HandlerResult, Request, Response, RpcError, RpcHandler, WireResponse,
    };

    pub use hermes_registry::{MethodDescriptor, Module, ModuleRegistry};

    pub use hermes_dispatch::{Dispatcher, RpcCall, Transport, TransportError};

    pub use hermes_transport_local::{LocalTransport, LocalTransportError};
}
