//! The middleware chain runner.
//!
//! The chain is `[configured middleware…, terminal action]`, executed
//! strictly by index as an explicit loop. Each member resolves a
//! [`Flow`]; the loop advances, forwards, or fails accordingly.
//! Running past the final member is a silent no-op: the terminal member
//! is expected to have committed the response, and if it did not, the
//! call never completes. That is a caller responsibility, not an
//! auto-send.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use hermes_core::{Flow, Request, Response, RpcError, RpcHandler};
use serde_json::{json, Value};

/// How one chain run ended.
#[derive(Debug)]
pub(crate) enum ChainOutcome {
    /// The chain ran to its end. Whoever answers has answered.
    Completed,
    /// A member aborted the chain to re-dispatch under a new method.
    Forwarded(String),
    /// A member failed; the error must be committed by the dispatcher.
    Failed(RpcError),
}

/// Runs the chain over the shared call state.
///
/// A member that resolves `Err` or panics is absorbed into the 500
/// handler-fault error. This is the only point where arbitrary handler
/// faults are absorbed rather than propagated; one bad call must not
/// destabilize the process.
pub(crate) async fn run_chain(
    chain: &[Arc<dyn RpcHandler>],
    request: &Arc<Request>,
    response: &Arc<Response>,
) -> ChainOutcome {
    for handler in chain {
        let future = handler.call(Arc::clone(request), Arc::clone(response));
        let flow = match AssertUnwindSafe(future).catch_unwind().await {
            Ok(Ok(flow)) => flow,
            Ok(Err(error)) => {
                return ChainOutcome::Failed(
                    RpcError::new(500, format!("failed to execute method with: {error}"))
                        .with_data(Value::String(format!("{error:?}"))),
                );
            }
            Err(panic) => {
                return ChainOutcome::Failed(RpcError::new(
                    500,
                    format!("failed to execute method with: {}", panic_message(&*panic)),
                ));
            }
        };

        match flow {
            Flow::Continue => {}
            Flow::Forward(method) => return ChainOutcome::Forwarded(method),
            Flow::Command(command) => {
                if let Some(target) = command.get("forward").and_then(Value::as_str) {
                    return ChainOutcome::Forwarded(target.to_owned());
                }
                return ChainOutcome::Failed(
                    RpcError::new(500, "middleware called next with illegal command")
                        .with_data(json!({ "cmd": command })),
                );
            }
        }
    }

    ChainOutcome::Completed
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_owned())
}
