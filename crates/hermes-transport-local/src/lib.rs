//! # Hermes Local Transport
//!
//! An in-process [`Transport`](hermes_dispatch::Transport) for the
//! Hermes RPC dispatch framework. Callers in the same process submit a
//! decoded payload and await the committed envelope; no wire is
//! involved. Useful for embedding a dispatcher behind another event
//! system and for exercising full deployments in tests.

#![doc(html_root_url = "https://docs.rs/hermes-transport-local/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod local;

pub use error::LocalTransportError;
pub use local::{AuthenticateFn, BeforeSendFn, LocalTransport, LocalTransportBuilder};
