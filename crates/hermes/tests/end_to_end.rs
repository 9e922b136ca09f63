//! Full-stack integration tests: local transport, dispatcher, modules.
//!
//! Every call here travels the real path: the transport emits the call
//! through its registered sink, the dispatcher spawns a task, runs the
//! pipeline, and the committed envelope comes back to the caller.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hermes::logging::{init_logging, LogConfig};
use hermes::prelude::*;
use serde_json::{json, Value};

fn math_registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register(
        "math",
        Module::new().action("add", |req: Arc<Request>, res: Arc<Response>| async move {
            let params = req.params();
            let sum = params["a"].as_i64().unwrap_or(0) + params["b"].as_i64().unwrap_or(0);
            res.send(Some(json!(sum)));
            Ok(Flow::Continue)
        }),
    );
    registry
}

fn envelope(method: &str, params: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": 7, "method": method, "params": params})
}

/// Wires a transport to a dispatcher over the given registry and
/// brings the stack up.
async fn bring_up(
    transport: &Arc<LocalTransport>,
    dispatcher: &Arc<Dispatcher>,
) {
    dispatcher.add_transport(Arc::clone(transport) as Arc<dyn Transport>);
    dispatcher.init().await.expect("init");
}

#[tokio::test]
async fn test_end_to_end_math_add() {
    let transport = LocalTransport::builder().build();
    let dispatcher = Dispatcher::builder(math_registry()).build();
    bring_up(&transport, &dispatcher).await;

    let reply = transport
        .call(envelope("math.add", json!({"a": 2, "b": 3})), None)
        .await
        .expect("reply");

    assert_eq!(reply.jsonrpc, "2.0");
    assert_eq!(reply.id, json!(7));
    assert_eq!(reply.result, Some(json!(5)));
    assert!(reply.error.is_none());
}

#[tokio::test]
async fn test_unknown_namespace_is_404() {
    let transport = LocalTransport::builder().build();
    let dispatcher = Dispatcher::builder(math_registry()).build();
    bring_up(&transport, &dispatcher).await;

    let reply = transport
        .call(envelope("physics.add", json!(null)), None)
        .await
        .expect("reply");

    let error = reply.error.expect("error envelope");
    assert_eq!(error.code, 404);
    assert_eq!(error.message, "module not found");
}

#[tokio::test]
async fn test_authentication_flows_into_authorization_and_handlers() {
    let auth_calls = Arc::new(AtomicUsize::new(0));
    let auth_counter = Arc::clone(&auth_calls);

    let transport = LocalTransport::builder()
        .authenticate(move |_context| {
            auth_counter.fetch_add(1, Ordering::SeqCst);
            async { json!({"user": "alice", "role": "admin"}) }
        })
        .build();

    let mut registry = math_registry();
    registry.register(
        "whoami",
        Module::new().action("get", |req: Arc<Request>, res: Arc<Response>| async move {
            let agent = req.agent().cloned().unwrap_or(Value::Null);
            res.send(Some(agent));
            Ok(Flow::Continue)
        }),
    );

    let dispatcher = Dispatcher::builder(registry)
        .authorize(|req: Arc<Request>| async move {
            Ok(req.agent().is_some_and(|agent| agent["role"] == "admin"))
        })
        .build();
    bring_up(&transport, &dispatcher).await;

    let reply = transport
        .call(envelope("whoami.get", json!(null)), None)
        .await
        .expect("reply");

    assert_eq!(
        reply.result,
        Some(json!({"user": "alice", "role": "admin"}))
    );
    assert_eq!(auth_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_forward_keeps_the_agent_and_answers_from_the_target() {
    let auth_calls = Arc::new(AtomicUsize::new(0));
    let auth_counter = Arc::clone(&auth_calls);

    let transport = LocalTransport::builder()
        .authenticate(move |_context| {
            auth_counter.fetch_add(1, Ordering::SeqCst);
            async { json!("agent-007") }
        })
        .build();

    let mut registry = ModuleRegistry::new();
    registry.register(
        "ns",
        Module::new()
            .action("action", |_req: Arc<Request>, res: Arc<Response>| async move {
                res.send(Some(json!("wrong handler")));
                Ok(Flow::Continue)
            })
            .action(
                "altAction",
                |req: Arc<Request>, res: Arc<Response>| async move {
                    res.send(Some(json!({
                        "agent": req.agent().cloned().unwrap_or(Value::Null),
                        "method": req.method(),
                    })));
                    Ok(Flow::Continue)
                },
            ),
    );

    let reroute = |req: Arc<Request>, _res: Arc<Response>| async move {
        if req.method().as_deref() == Some("ns.action") {
            return Ok(Flow::forward("ns.altAction"));
        }
        Ok(Flow::Continue)
    };

    let dispatcher = Dispatcher::builder(registry).middleware(reroute).build();
    bring_up(&transport, &dispatcher).await;

    let reply = transport
        .call(envelope("ns.action", json!(null)), None)
        .await
        .expect("reply");

    assert_eq!(
        reply.result,
        Some(json!({"agent": "agent-007", "method": "ns.altAction"}))
    );
    // One authenticate for the original attempt, none for the forward.
    assert_eq!(auth_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_single_error_is_bare_and_multiple_collapse() {
    let mut registry = ModuleRegistry::new();
    registry.register(
        "orders",
        Module::new()
            .action(
                "reject",
                |_req: Arc<Request>, res: Arc<Response>| async move {
                    res.add_error(RpcError::new(409, "order already shipped"));
                    res.send(None);
                    Ok(Flow::Continue)
                },
            )
            .action(
                "rejectTwice",
                |_req: Arc<Request>, res: Arc<Response>| async move {
                    res.add_error(RpcError::new(409, "order already shipped"));
                    res.add_error(RpcError::new(500, "ledger out of sync"));
                    res.send(None);
                    Ok(Flow::Continue)
                },
            ),
    );

    let transport = LocalTransport::builder().build();
    let dispatcher = Dispatcher::builder(registry).build();
    bring_up(&transport, &dispatcher).await;

    let reply = transport
        .call(envelope("orders.reject", json!(null)), None)
        .await
        .expect("reply");
    let error = reply.error.expect("error envelope");
    assert_eq!(error.code, 409);
    assert_eq!(error.message, "order already shipped");

    let reply = transport
        .call(envelope("orders.rejectTwice", json!(null)), None)
        .await
        .expect("reply");
    let error = reply.error.expect("error envelope");
    assert_eq!(error.code, 400);
    assert_eq!(error.message, "multiple errors");
    assert_eq!(
        error.data,
        json!([
            {"code": 409, "message": "order already shipped", "data": null},
            {"code": 500, "message": "ledger out of sync", "data": null}
        ])
    );
}

#[tokio::test]
async fn test_before_send_applies_to_dispatched_calls() {
    let transport = LocalTransport::builder()
        .before_send(|mut wire| {
            if let Some(result) = wire.result.take() {
                wire.result = Some(json!({"wrapped": result}));
            }
            wire
        })
        .build();

    let dispatcher = Dispatcher::builder(math_registry()).build();
    bring_up(&transport, &dispatcher).await;

    let reply = transport
        .call(envelope("math.add", json!({"a": 2, "b": 3})), None)
        .await
        .expect("reply");

    assert_eq!(reply.result, Some(json!({"wrapped": 5})));
}

#[tokio::test]
async fn test_teardown_refuses_further_calls() {
    let transport = LocalTransport::builder().build();
    let dispatcher = Dispatcher::builder(math_registry()).build();
    bring_up(&transport, &dispatcher).await;

    dispatcher.teardown().await.expect("teardown");

    assert_eq!(
        transport
            .call(envelope("math.add", json!(null)), None)
            .await
            .unwrap_err(),
        LocalTransportError::NotInitialized
    );
}

#[tokio::test]
async fn test_logging_bootstrap_and_dispatch() {
    // First installation in this process wins; either way dispatch
    // keeps working.
    let _ = init_logging(&LogConfig {
        level: "debug".to_string(),
        ..LogConfig::default()
    });

    let transport = LocalTransport::builder().build();
    let dispatcher = Dispatcher::builder(math_registry()).build();
    bring_up(&transport, &dispatcher).await;

    let reply = transport
        .call(envelope("math.add", json!({"a": 20, "b": 22})), None)
        .await
        .expect("reply");
    assert_eq!(reply.result, Some(json!(42)));
}
