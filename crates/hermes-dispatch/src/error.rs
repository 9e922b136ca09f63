//! Transport lifecycle errors.

use thiserror::Error;

/// Error type for transport lifecycle failures.
///
/// These surface from [`Dispatcher::init`](crate::Dispatcher::init) and
/// [`Dispatcher::teardown`](crate::Dispatcher::teardown) to the
/// surrounding application; they never travel on the wire.
#[derive(Error, Debug)]
pub enum TransportError {
    /// A transport failed to initialize.
    #[error("transport init failed: {0}")]
    Init(String),

    /// A transport failed to tear down.
    #[error("transport teardown failed: {0}")]
    Teardown(String),
}

impl TransportError {
    /// Creates an init failure.
    #[must_use]
    pub fn init(message: impl Into<String>) -> Self {
        Self::Init(message.into())
    }

    /// Creates a teardown failure.
    #[must_use]
    pub fn teardown(message: impl Into<String>) -> Self {
        Self::Teardown(message.into())
    }
}
