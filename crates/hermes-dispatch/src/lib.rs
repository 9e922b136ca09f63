//! # Hermes Dispatch
//!
//! The dispatch pipeline for the Hermes RPC framework.
//!
//! A [`Transport`] emits one [`RpcCall`] per inbound message. The
//! [`Dispatcher`] runs each call through a fixed, short-circuiting
//! pipeline: envelope validation, authentication, authorization,
//! method resolution, then the middleware chain whose terminal member
//! is the resolved module action. Every failure along the way degrades
//! to a committed error response; nothing a handler does can crash the
//! process.
//!
//! ```text
//! Transport ──rpc──▶ validate ▶ authenticate ▶ authorize ▶ resolve ▶ [middleware…, action]
//!                        │            │             │          │               │
//!                        └────────────┴── error ────┴──────────┘        send / forward
//! ```
//!
//! A chain member may forward the call to a different method; the
//! dispatcher then re-runs the pipeline on the same request identity
//! without re-authenticating.

#![doc(html_root_url = "https://docs.rs/hermes-dispatch/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod chain;
mod dispatcher;
mod error;
mod transport;

pub use dispatcher::{AuthorizeFn, Dispatcher, DispatcherBuilder};
pub use error::TransportError;
pub use transport::{RpcCall, RpcSink, Transport};
