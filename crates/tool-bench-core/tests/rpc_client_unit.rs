// crates/tool-bench-core/tests/rpc_client_unit.rs
// ============================================================================
// Module: RPC Client Unit Tests
// Description: Request framing and outcome classification.
// Purpose: Validate one-request-one-outcome behavior over scripted transports.
// ============================================================================

//! RPC client tests over scripted transports.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use serde_json::json;
use tool_bench_core::RpcClient;
use tool_bench_core::RpcOutcome;
use tool_bench_core::TransportError;

use crate::common::ScriptedTransport;

const ENDPOINT: &str = "http://127.0.0.1:9/mcp";

#[test]
fn params_are_sent_when_supplied() {
    let transport = ScriptedTransport::always_json(&json!({"result": "ok"}));
    let client = RpcClient::new(&transport);

    let outcome = client.call(ENDPOINT, "tools/call", Some(json!({"name": "echo"})));

    assert_eq!(outcome, RpcOutcome::Result(json!("ok")));
    assert_eq!(
        transport.requests()[0].1,
        json!({"jsonrpc": "2.0", "method": "tools/call", "id": 1, "params": {"name": "echo"}})
    );
}

#[test]
fn exchange_returns_raw_envelope() {
    let envelope = json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -1, "message": "x"}});
    let transport = ScriptedTransport::always_json(&envelope);
    let client = RpcClient::new(&transport);

    assert_eq!(client.exchange(ENDPOINT, "tools/list", None), Ok(envelope));
}

#[test]
fn invalid_json_is_a_transport_failure() {
    let transport = ScriptedTransport::always_body(b"not json");
    let client = RpcClient::new(&transport);

    let outcome = client.call(ENDPOINT, "tools/list", None);

    assert_eq!(outcome, RpcOutcome::TransportFailure("invalid JSON response".to_string()));
}

#[test]
fn status_failures_are_stringified() {
    let transport = ScriptedTransport::always_err(TransportError::Status {
        status: 503,
        preview: "unavailable".to_string(),
    });
    let client = RpcClient::new(&transport);

    let outcome = client.call(ENDPOINT, "tools/list", None);

    assert_eq!(outcome, RpcOutcome::TransportFailure("http status 503: unavailable".to_string()));
}

#[test]
fn one_request_per_call() {
    let transport = ScriptedTransport::always_err(TransportError::Timeout("slow".to_string()));
    let client = RpcClient::new(&transport);

    let _ = client.call(ENDPOINT, "tools/call", None);

    assert_eq!(transport.requests().len(), 1);
}
