//! Local transport errors.

use thiserror::Error;

/// Error type for local call submission.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalTransportError {
    /// `call` ran before `init`; the transport is not accepting calls.
    #[error("local transport is not initialized")]
    NotInitialized,

    /// No dispatcher has registered a sink on this transport.
    #[error("local transport is not bound to a dispatcher")]
    NotBound,

    /// The call's response was dropped without ever being committed.
    /// There is no dispatch timeout; a handler that never answers
    /// surfaces here when its call state is released.
    #[error("call abandoned before a response was committed")]
    Abandoned,
}
