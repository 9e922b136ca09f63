//! # Hermes Core
//!
//! Core protocol types for the Hermes RPC dispatch framework.
//!
//! This crate provides the value objects one call travels through:
//!
//! - [`Request`] - the inbound envelope plus the authenticated agent
//! - [`Response`] - the write-once committed outcome of a call
//! - [`RpcError`] - the `{code, message, data}` wire error object
//! - [`WireResponse`] - the JSON-RPC 2.0 response envelope
//! - [`RpcHandler`] / [`Flow`] - the contract middleware and module
//!   actions share

#![doc(html_root_url = "https://docs.rs/hermes-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod envelope;
mod error;
mod handler;
mod request;
mod response;

pub use envelope::{validate_request_envelope, WireResponse, JSONRPC_VERSION};
pub use error::RpcError;
pub use handler::{BoxFuture, Flow, HandlerResult, RpcHandler};
pub use request::Request;
pub use response::Response;
