// crates/tool-bench-server/tests/api_routes.rs
// ============================================================================
// Module: HTTP API Route Tests
// Description: End-to-end API behavior against the in-thread mock endpoint.
// Purpose: Validate status codes, payload shapes, and audit emission.
// ============================================================================

//! ## Overview
//! Serves the API router backed by the in-memory store and the real HTTP
//! transport, pointed at the mock tool endpoint:
//! - tool listing with unreachable, remote-error, and malformed endpoints
//! - runs, reads, and listings with their JSON shapes
//! - request validation without side effects
//! - body limits, readiness, and static frontend files

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

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::routing::post;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use serde_json::json;
use tool_bench_core::InMemoryExperimentStore;
use tool_bench_core::ToolBench;
use tool_bench_rpc::HttpTransport;
use tool_bench_server::ApiState;
use tool_bench_server::AuditSink;
use tool_bench_server::MockToolConfig;
use tool_bench_server::build_router;
use tool_bench_server::mock_router;

use crate::common::RecordingAuditSink;
use crate::common::TestServer;
use crate::common::client;
use crate::common::closed_endpoint;
use crate::common::test_transport;

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Servers are declared first so they shut down before the shared state drops.
struct Harness {
    api: TestServer,
    mock: TestServer,
    audit: Arc<RecordingAuditSink>,
    state: Arc<ApiState<HttpTransport, InMemoryExperimentStore>>,
}

impl Harness {
    fn new(max_body_bytes: usize, frontend_dir: Option<PathBuf>) -> Self {
        let mock = TestServer::spawn(mock_router(MockToolConfig::default())).unwrap();
        let audit = Arc::new(RecordingAuditSink::default());
        let sink: Arc<dyn AuditSink> = audit.clone();
        let bench = ToolBench::new(test_transport(), InMemoryExperimentStore::new());
        let state = Arc::new(
            ApiState::new(bench, sink).with_default_iterations(2).with_frontend_dir(frontend_dir),
        );
        let api = TestServer::spawn(build_router(Arc::clone(&state), max_body_bytes)).unwrap();
        Self {
            api,
            mock,
            audit,
            state,
        }
    }

    fn mock_url(&self) -> String {
        self.mock.url("/mcp")
    }

    fn post(&self, path: &str, body: &str) -> (u16, Value) {
        let response = client()
            .post(self.api.url(path))
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .unwrap();
        let status = response.status().as_u16();
        let text = response.text().unwrap();
        (status, serde_json::from_str(&text).unwrap_or(Value::Null))
    }

    fn post_json(&self, path: &str, body: &Value) -> (u16, Value) {
        self.post(path, &body.to_string())
    }

    fn get(&self, path: &str) -> (u16, Value) {
        let response = client().get(self.api.url(path)).send().unwrap();
        let status = response.status().as_u16();
        let text = response.text().unwrap();
        (status, serde_json::from_str(&text).unwrap_or(Value::Null))
    }
}

fn fixed_endpoint(envelope: Value) -> TestServer {
    let app = Router::new().route(
        "/mcp",
        post(move || {
            let envelope = envelope.clone();
            async move { Json(envelope) }
        }),
    );
    TestServer::spawn(app).unwrap()
}

// ============================================================================
// SECTION: Tools
// ============================================================================

#[test]
fn tools_route_lists_mock_tools() {
    let harness = Harness::new(1024 * 1024, None);
    let (status, body) =
        harness.post_json("/api/tools", &json!({ "serverUrl": harness.mock_url() }));
    assert_eq!(status, 200);
    let tools = body["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 3);
    assert_eq!(tools[0]["name"], "echo");
    assert_eq!(tools[0]["inputSchema"]["type"], "object");

    let (status, body) = harness.post_json("/api/tools", &json!({}));
    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "Server URL is required" }));
}

#[test]
fn tools_route_maps_endpoint_failures() {
    let harness = Harness::new(1024 * 1024, None);

    let (status, body) =
        harness.post_json("/api/tools", &json!({ "serverUrl": closed_endpoint() }));
    assert_eq!(status, 500);
    assert!(!body["error"].as_str().unwrap().is_empty());

    let remote = fixed_endpoint(json!({
        "jsonrpc": "2.0", "id": 1, "error": { "code": -32603, "message": "catalog offline" }
    }));
    let (status, body) =
        harness.post_json("/api/tools", &json!({ "serverUrl": remote.url("/mcp") }));
    assert_eq!(status, 500);
    assert_eq!(body["error"], "catalog offline");

    let malformed = fixed_endpoint(json!({ "jsonrpc": "2.0", "id": 1, "result": {} }));
    let (status, body) =
        harness.post_json("/api/tools", &json!({ "serverUrl": malformed.url("/mcp") }));
    assert_eq!(status, 502);
    assert_eq!(body["error"], "Invalid response format from server");
    assert_eq!(body["raw"]["result"], json!({}));
}

// ============================================================================
// SECTION: Runs
// ============================================================================

#[test]
fn run_then_read_experiment() {
    let harness = Harness::new(1024 * 1024, None);
    let (status, body) = harness.post_json(
        "/api/run",
        &json!({
            "serverUrl": harness.mock_url(),
            "toolName": "echo",
            "arguments": "{\"message\":\"hi\"}",
            "iterations": 3
        }),
    );
    assert_eq!(status, 200, "{body}");
    let id = body["experimentId"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 8);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    for (offset, result) in results.iter().enumerate() {
        assert_eq!(result["iteration"], offset + 1);
        assert_eq!(result["status"], "success");
        assert!(result["response"].as_str().unwrap().contains("Echo: hi"));
        assert!(result["duration_ms"].as_f64().unwrap() >= 0.0);
    }
    assert_eq!(body["summary"]["iterations"], 3);
    assert_eq!(body["summary"]["success"], 3);

    let (status, body) = harness.get(&format!("/api/experiments/{id}"));
    assert_eq!(status, 200);
    assert_eq!(body["experiment"]["id"], id.as_str());
    assert_eq!(body["experiment"]["serverUrl"], harness.mock_url().as_str());
    assert_eq!(body["experiment"]["toolName"], "echo");
    assert_eq!(body["experiment"]["arguments"], "{\"message\":\"hi\"}");
    assert_eq!(body["experiment"]["iterations"], 3);
    assert!(body["experiment"]["timestamp"].as_str().unwrap().contains('T'));
    assert_eq!(body["results"].as_array().unwrap().len(), 3);
    assert_eq!(body["results"][2]["iteration"], 3);

    let (status, body) = harness.get("/api/experiments");
    assert_eq!(status, 200);
    assert_eq!(body["experiments"][0]["id"], id.as_str());
    assert_eq!(body["experiments"][0]["recordedResults"], 3);

    let labels = harness.audit.run_labels();
    assert_eq!(labels.first(), Some(&"experiment_started"));
    assert_eq!(labels.last(), Some(&"experiment_completed"));
    assert_eq!(labels.len(), 5);
    let run_event = harness
        .audit
        .api_events()
        .into_iter()
        .find(|event| event.route == "/api/run")
        .unwrap();
    assert_eq!(run_event.status, 200);
    assert_eq!(run_event.experiment_id.as_deref(), Some(id.as_str()));
}

#[test]
fn run_defaults_iterations_and_records_tool_errors() {
    let harness = Harness::new(1024 * 1024, None);
    let (status, body) = harness.post_json(
        "/api/run",
        &json!({ "serverUrl": harness.mock_url(), "toolName": "error_tool" }),
    );
    assert_eq!(status, 200);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|result| result["status"] == "error"));
    assert_eq!(results[0]["response"], "This tool always fails");
    assert_eq!(body["summary"]["error"], 2);
}

#[test]
fn run_against_closed_endpoint_records_errors() {
    let harness = Harness::new(1024 * 1024, None);
    let (status, body) = harness.post_json(
        "/api/run",
        &json!({ "serverUrl": closed_endpoint(), "toolName": "echo", "iterations": "1" }),
    );
    assert_eq!(status, 200);
    assert_eq!(body["results"][0]["status"], "error");
    assert_eq!(body["summary"]["error"], 1);
}

#[test]
fn run_validation_rejects_without_side_effects() {
    let harness = Harness::new(1024 * 1024, None);
    let url = harness.mock_url();

    let (status, body) = harness.post_json("/api/run", &json!({ "serverUrl": url }));
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Server URL and tool name are required");

    let (status, body) = harness.post_json(
        "/api/run",
        &json!({ "serverUrl": url, "toolName": "echo", "arguments": "not valid json" }),
    );
    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "Invalid JSON arguments" }));

    let (status, _) = harness.post_json(
        "/api/run",
        &json!({ "serverUrl": url, "toolName": "echo", "arguments": "[1, 2]" }),
    );
    assert_eq!(status, 400);

    let (status, _) = harness.post_json(
        "/api/run",
        &json!({ "serverUrl": url, "toolName": "echo", "iterations": -2 }),
    );
    assert_eq!(status, 400);

    let (status, body) = harness.post("/api/run", "{not json");
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Invalid JSON body");

    assert!(harness.state.bench().list_experiments().unwrap().is_empty());
    assert!(harness.audit.run_labels().is_empty());
}

#[test]
fn zero_iterations_store_an_empty_experiment() {
    let harness = Harness::new(1024 * 1024, None);
    let (status, body) = harness.post_json(
        "/api/run",
        &json!({ "serverUrl": harness.mock_url(), "toolName": "echo", "iterations": 0 }),
    );
    assert_eq!(status, 200);
    assert_eq!(body["results"], json!([]));
    let id = body["experimentId"].as_str().unwrap();
    let (status, body) = harness.get(&format!("/api/experiments/{id}"));
    assert_eq!(status, 200);
    assert_eq!(body["experiment"]["iterations"], 0);
    assert_eq!(body["summary"]["mean_ms"], Value::Null);
}

// ============================================================================
// SECTION: Reads and Limits
// ============================================================================

#[test]
fn missing_experiment_is_not_found() {
    let harness = Harness::new(1024 * 1024, None);
    let (status, body) = harness.get("/api/experiments/deadbeef");
    assert_eq!(status, 404);
    assert_eq!(body, json!({ "error": "Experiment not found" }));
}

#[test]
fn readiness_reports_ready() {
    let harness = Harness::new(1024 * 1024, None);
    let (status, body) = harness.get("/readyz");
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ready");
}

#[test]
fn oversized_bodies_are_rejected() {
    let harness = Harness::new(64, None);
    let padding = "x".repeat(256);
    let (status, _) = harness.post_json(
        "/api/run",
        &json!({ "serverUrl": harness.mock_url(), "toolName": "echo", "pad": padding }),
    );
    assert_eq!(status, 413);
    assert!(harness.state.bench().list_experiments().unwrap().is_empty());
}

// ============================================================================
// SECTION: Frontend
// ============================================================================

#[test]
fn frontend_files_are_served_from_the_configured_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "<h1>bench</h1>").unwrap();
    fs::write(dir.path().join("script.js"), "console.log('bench');").unwrap();
    let harness = Harness::new(1024 * 1024, Some(dir.path().to_path_buf()));

    let response = client().get(harness.api.url("/")).send().unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert!(response.headers()[CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
    assert_eq!(response.text().unwrap(), "<h1>bench</h1>");

    let response = client().get(harness.api.url("/script.js")).send().unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert!(response.headers()[CONTENT_TYPE].to_str().unwrap().starts_with("text/javascript"));

    let (status, _) = harness.get("/missing.css");
    assert_eq!(status, 404);
    let (status, _) = harness.post("/script.js", "{}");
    assert_eq!(status, 404);
}

#[test]
fn frontend_paths_are_percent_decoded() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("my logo.svg"), "<svg/>").unwrap();
    let harness = Harness::new(1024 * 1024, Some(dir.path().to_path_buf()));

    let response = client().get(harness.api.url("/my%20logo.svg")).send().unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().unwrap(), "<svg/>");

    let (status, _) = harness.get("/%2e%2e%2fmy%20logo.svg");
    assert_eq!(status, 404);
}

#[test]
fn frontend_is_absent_without_a_directory() {
    let harness = Harness::new(1024 * 1024, None);
    let (status, body) = harness.get("/");
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Not found");
    assert!(harness.api.base_url().starts_with("http://127.0.0.1:"));
}
