// crates/tool-bench-server/src/mock.rs
// ============================================================================
// Module: Mock Tool Endpoint
// Description: Minimal JSON-RPC tool server with simulated latency.
// Purpose: Provide a local target for benchmarks and integration tests.
// Dependencies: axum, rand, serde_json, tokio
// ============================================================================

//! ## Overview
//! `POST /mcp` answers `tools/list` with three tools and `tools/call` with:
//! - `echo`: `Echo: <message>`
//! - `random_number`: an integer in `min..=max` (defaults 0 and 100)
//! - `error_tool`: JSON-RPC error `-32000`
//!
//! Anything else yields `-32601 Method not found`. Calls to `tools/call`
//! sleep for a random delay in the configured range first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::post;
use rand::Rng;
use serde_json::Value;
use serde_json::json;
use tool_bench_core::JSONRPC_VERSION;
use tool_bench_core::METHOD_TOOLS_CALL;
use tool_bench_core::METHOD_TOOLS_LIST;

use crate::server::ServerError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Route of the mock endpoint.
pub const MOCK_ROUTE: &str = "/mcp";
/// Error code returned by `error_tool`.
const TOOL_FAILURE_CODE: i64 = -32000;
/// Error code for unknown methods and tools.
const METHOD_NOT_FOUND_CODE: i64 = -32601;
/// Error code for invalid tool parameters.
const INVALID_PARAMS_CODE: i64 = -32602;
/// Error code for unparseable requests.
const PARSE_ERROR_CODE: i64 = -32700;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Simulated latency range for `tools/call`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MockToolConfig {
    /// Lower bound of the per-call delay.
    pub min_delay: Duration,
    /// Upper bound of the per-call delay.
    pub max_delay: Duration,
}

impl MockToolConfig {
    /// Creates a config from millisecond bounds; the bounds are sorted.
    #[must_use]
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_delay: Duration::from_millis(min_ms.min(max_ms)),
            max_delay: Duration::from_millis(min_ms.max(max_ms)),
        }
    }

    /// Draws a delay from the configured range.
    fn sample_delay(&self) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        rand::thread_rng().gen_range(self.min_delay ..= self.max_delay)
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the mock endpoint router.
pub fn mock_router(config: MockToolConfig) -> Router {
    Router::new().route(MOCK_ROUTE, post(handle_mcp)).with_state(Arc::new(config))
}

/// Serves the mock endpoint until the process exits.
///
/// # Errors
///
/// Returns [`ServerError::Transport`] when binding or serving fails.
pub async fn serve_mock(bind: SocketAddr, config: MockToolConfig) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|err| ServerError::Transport(format!("mock bind failed: {err}")))?;
    let _ = writeln!(std::io::stderr(), "tool-bench mock: listening on http://{bind}{MOCK_ROUTE}");
    axum::serve(listener, mock_router(config))
        .await
        .map_err(|err| ServerError::Transport(format!("mock server failed: {err}")))
}

/// Handles one JSON-RPC request.
async fn handle_mcp(State(config): State<Arc<MockToolConfig>>, body: Bytes) -> Response {
    let Ok(request) = serde_json::from_slice::<Value>(&body) else {
        let reply = error_envelope(&Value::Null, PARSE_ERROR_CODE, "Parse error");
        return (StatusCode::BAD_REQUEST, Json(reply)).into_response();
    };
    if request.get("method").and_then(Value::as_str) == Some(METHOD_TOOLS_CALL) {
        let delay = config.sample_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
    Json(dispatch(&request)).into_response()
}

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Produces the response envelope for a parsed request.
#[must_use]
pub fn dispatch(request: &Value) -> Value {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    match request.get("method").and_then(Value::as_str) {
        Some(METHOD_TOOLS_LIST) => result_envelope(&id, tool_catalog()),
        Some(METHOD_TOOLS_CALL) => {
            let params = request.get("params");
            let name = params.and_then(|params| params.get("name")).and_then(Value::as_str);
            let empty = json!({});
            let arguments =
                params.and_then(|params| params.get("arguments")).unwrap_or(&empty);
            call_tool(&id, name, arguments)
        }
        _ => error_envelope(&id, METHOD_NOT_FOUND_CODE, "Method not found"),
    }
}

/// Invokes one mock tool.
fn call_tool(id: &Value, name: Option<&str>, arguments: &Value) -> Value {
    match name {
        Some("echo") => {
            let message = arguments.get("message").map_or_else(String::new, text_of);
            result_envelope(id, text_content(&format!("Echo: {message}")))
        }
        Some("random_number") => {
            let (Some(min), Some(max)) =
                (integer_arg(arguments, "min", 0), integer_arg(arguments, "max", 100))
            else {
                return error_envelope(id, INVALID_PARAMS_CODE, "min and max must be integers");
            };
            if min > max {
                return error_envelope(id, INVALID_PARAMS_CODE, "min must not exceed max");
            }
            let value = rand::thread_rng().gen_range(min ..= max);
            result_envelope(id, text_content(&value.to_string()))
        }
        Some("error_tool") => error_envelope(id, TOOL_FAILURE_CODE, "This tool always fails"),
        _ => error_envelope(id, METHOD_NOT_FOUND_CODE, "Method not found"),
    }
}

/// Advertised tool descriptors.
fn tool_catalog() -> Value {
    json!({
        "tools": [
            {
                "name": "echo",
                "description": "Echoes back the input",
                "inputSchema": {
                    "type": "object",
                    "properties": { "message": { "type": "string" } }
                }
            },
            {
                "name": "random_number",
                "description": "Returns a random number",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "min": { "type": "integer" },
                        "max": { "type": "integer" }
                    }
                }
            },
            {
                "name": "error_tool",
                "description": "Always returns an error",
                "inputSchema": { "type": "object", "properties": {} }
            }
        ]
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Success envelope.
fn result_envelope(id: &Value, result: Value) -> Value {
    json!({ "jsonrpc": JSONRPC_VERSION, "id": id, "result": result })
}

/// Error envelope.
fn error_envelope(id: &Value, code: i64, message: &str) -> Value {
    json!({ "jsonrpc": JSONRPC_VERSION, "id": id, "error": { "code": code, "message": message } })
}

/// Single text content block.
fn text_content(text: &str) -> Value {
    json!({ "content": [{ "type": "text", "text": text }] })
}

/// Renders an argument as display text; strings are not quoted.
fn text_of(value: &Value) -> String {
    value.as_str().map_or_else(|| value.to_string(), str::to_string)
}

/// Reads an integer argument that may arrive as a number or numeric string.
fn integer_arg(arguments: &Value, key: &str, default: i64) -> Option<i64> {
    match arguments.get(key) {
        None | Some(Value::Null) => Some(default),
        Some(Value::Number(number)) => number.as_i64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        Some(_) => None,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
