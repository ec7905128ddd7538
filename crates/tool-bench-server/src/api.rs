// crates/tool-bench-server/src/api.rs
// ============================================================================
// Module: HTTP API
// Description: JSON routes for tool listing, experiment runs, and reads.
// Purpose: Map HTTP requests onto the benchmarking service.
// Dependencies: axum, serde, serde_json, tokio, tool-bench-core
// ============================================================================

//! ## Overview
//! Routes accept camelCase JSON bodies and answer with JSON. Service calls
//! block on network and disk, so each one runs on the blocking thread pool.
//! Every `/api` request emits one [`crate::audit::ApiAuditEvent`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::Path;
use axum::extract::State;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::json;
use tool_bench_config::DEFAULT_ITERATIONS;
use tool_bench_core::CatalogError;
use tool_bench_core::ExperimentId;
use tool_bench_core::ExperimentRecord;
use tool_bench_core::ExperimentStore;
use tool_bench_core::ExperimentSummary;
use tool_bench_core::IterationResult;
use tool_bench_core::RandomExperimentIds;
use tool_bench_core::RpcTransport;
use tool_bench_core::RunError;
use tool_bench_core::RunReport;
use tool_bench_core::RunRequest;
use tool_bench_core::StoreError;
use tool_bench_core::ToolBench;

use crate::audit::ApiAuditEvent;
use crate::audit::ApiAuditEventParams;
use crate::audit::AuditSink;
use crate::audit::RunAuditForwarder;
use crate::frontend;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tool listing route.
const ROUTE_TOOLS: &str = "/api/tools";
/// Experiment run route.
const ROUTE_RUN: &str = "/api/run";
/// Experiment listing route.
const ROUTE_EXPERIMENTS: &str = "/api/experiments";
/// Single experiment route.
const ROUTE_EXPERIMENT: &str = "/api/experiments/{id}";
/// Readiness probe route.
const ROUTE_READY: &str = "/readyz";

/// Error for bodies that are not JSON objects of the expected shape.
const INVALID_BODY: &str = "Invalid JSON body";
/// Error for argument payloads that are not JSON objects.
const INVALID_ARGUMENTS: &str = "Invalid JSON arguments";

/// Status code and JSON body produced by a handler.
type ApiReply = (StatusCode, Value);

// ============================================================================
// SECTION: State
// ============================================================================

/// Shared state for API handlers.
pub struct ApiState<T, S> {
    /// Benchmarking service.
    bench: ToolBench<T, S>,
    /// Audit sink for requests and runs.
    audit: Arc<dyn AuditSink>,
    /// Iterations used when a run request omits a count.
    default_iterations: u32,
    /// Static frontend directory.
    frontend_dir: Option<PathBuf>,
}

impl<T, S> ApiState<T, S> {
    /// Creates state with default iterations and no frontend.
    #[must_use]
    pub fn new(bench: ToolBench<T, S>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            bench,
            audit,
            default_iterations: DEFAULT_ITERATIONS,
            frontend_dir: None,
        }
    }

    /// Sets the iteration count used when a request omits one.
    #[must_use]
    pub const fn with_default_iterations(mut self, iterations: u32) -> Self {
        self.default_iterations = iterations;
        self
    }

    /// Sets the static frontend directory.
    #[must_use]
    pub fn with_frontend_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.frontend_dir = dir;
        self
    }

    /// Returns the benchmarking service.
    #[must_use]
    pub const fn bench(&self) -> &ToolBench<T, S> {
        &self.bench
    }

    /// Records the audit event for a finished request and renders the reply.
    fn finish(
        &self,
        request: &RequestMeta,
        experiment_id: Option<String>,
        reply: ApiReply,
    ) -> Response {
        let (status, body) = reply;
        self.audit.record(&ApiAuditEvent::new(ApiAuditEventParams {
            method: request.method,
            route: request.route,
            status: status.as_u16(),
            duration_ms: request.started.elapsed().as_millis(),
            request_bytes: request.request_bytes,
            experiment_id,
        }));
        (status, Json(body)).into_response()
    }
}

/// Request metadata captured before the handler runs.
struct RequestMeta {
    /// HTTP method.
    method: &'static str,
    /// Route template.
    route: &'static str,
    /// Handler start time.
    started: Instant,
    /// Request body size in bytes.
    request_bytes: usize,
}

impl RequestMeta {
    /// Starts timing a request.
    fn start(method: &'static str, route: &'static str, request_bytes: usize) -> Self {
        Self {
            method,
            route,
            started: Instant::now(),
            request_bytes,
        }
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the API router with the static frontend as fallback.
pub fn build_router<T, S>(state: Arc<ApiState<T, S>>, max_body_bytes: usize) -> Router
where
    T: RpcTransport + Send + Sync + 'static,
    S: ExperimentStore + Send + Sync + 'static,
{
    Router::new()
        .route(ROUTE_TOOLS, post(list_tools::<T, S>))
        .route(ROUTE_RUN, post(run_experiment::<T, S>))
        .route(ROUTE_EXPERIMENTS, get(list_experiments::<T, S>))
        .route(ROUTE_EXPERIMENT, get(get_experiment::<T, S>))
        .route(ROUTE_READY, get(readiness::<T, S>))
        .fallback(static_fallback::<T, S>)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

// ============================================================================
// SECTION: Request Bodies
// ============================================================================

/// Body of `POST /api/tools`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolsBody {
    /// Endpoint URL.
    #[serde(default)]
    server_url: Option<String>,
}

/// Body of `POST /api/run`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunBody {
    /// Endpoint URL.
    #[serde(default)]
    server_url: Option<String>,
    /// Tool under test.
    #[serde(default)]
    tool_name: Option<String>,
    /// JSON object text, or an object.
    #[serde(default)]
    arguments: Option<Value>,
    /// Iteration count as a number or numeric string.
    #[serde(default)]
    iterations: Option<Value>,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Lists the tools advertised by an endpoint.
async fn list_tools<T, S>(State(state): State<Arc<ApiState<T, S>>>, body: Bytes) -> Response
where
    T: RpcTransport + Send + Sync + 'static,
    S: ExperimentStore + Send + Sync + 'static,
{
    let meta = RequestMeta::start("POST", ROUTE_TOOLS, body.len());
    let reply = match parse_body::<ToolsBody>(&body) {
        Err(reply) => reply,
        Ok(request) => match required(request.server_url) {
            None => bad_request("Server URL is required"),
            Some(url) => match blocking(&state, move |state| state.bench.list_tools(&url)).await {
                Ok(Ok(tools)) => (StatusCode::OK, json!({ "tools": tools })),
                Ok(Err(err)) => catalog_failure(err),
                Err(reply) => reply,
            },
        },
    };
    state.finish(&meta, None, reply)
}

/// Runs an experiment and returns its results.
async fn run_experiment<T, S>(State(state): State<Arc<ApiState<T, S>>>, body: Bytes) -> Response
where
    T: RpcTransport + Send + Sync + 'static,
    S: ExperimentStore + Send + Sync + 'static,
{
    let meta = RequestMeta::start("POST", ROUTE_RUN, body.len());
    let mut experiment_id = None;
    let reply = match parse_run_request(&body, state.default_iterations) {
        Err(reply) => reply,
        Ok(request) => {
            let outcome = blocking(&state, move |state| {
                let forwarder = RunAuditForwarder::new(state.audit.as_ref());
                state.bench.run_with(&request, &RandomExperimentIds, &forwarder)
            })
            .await;
            match outcome {
                Ok(Ok(report)) => {
                    experiment_id = Some(report.experiment.id.to_string());
                    (StatusCode::OK, run_report_json(&report))
                }
                Ok(Err(RunError::InvalidArguments(_))) => bad_request(INVALID_ARGUMENTS),
                Ok(Err(RunError::Store(err))) => internal_error(&err.to_string()),
                Err(reply) => reply,
            }
        }
    };
    state.finish(&meta, experiment_id, reply)
}

/// Returns one experiment with its ordered results.
async fn get_experiment<T, S>(
    State(state): State<Arc<ApiState<T, S>>>,
    Path(id): Path<String>,
) -> Response
where
    T: RpcTransport + Send + Sync + 'static,
    S: ExperimentStore + Send + Sync + 'static,
{
    let meta = RequestMeta::start("GET", ROUTE_EXPERIMENT, 0);
    let experiment_id = ExperimentId::new(id);
    let lookup = experiment_id.clone();
    let reply = match blocking(&state, move |state| state.bench.get_experiment(&lookup)).await {
        Ok(Ok(record)) => (StatusCode::OK, experiment_json(&record)),
        Ok(Err(StoreError::NotFound(_))) => {
            (StatusCode::NOT_FOUND, json!({ "error": "Experiment not found" }))
        }
        Ok(Err(err)) => internal_error(&err.to_string()),
        Err(reply) => reply,
    };
    state.finish(&meta, Some(experiment_id.to_string()), reply)
}

/// Lists stored experiments, newest first.
async fn list_experiments<T, S>(State(state): State<Arc<ApiState<T, S>>>) -> Response
where
    T: RpcTransport + Send + Sync + 'static,
    S: ExperimentStore + Send + Sync + 'static,
{
    let meta = RequestMeta::start("GET", ROUTE_EXPERIMENTS, 0);
    let reply = match blocking(&state, |state| state.bench.list_experiments()).await {
        Ok(Ok(summaries)) => {
            let experiments: Vec<Value> = summaries.iter().map(summary_json).collect();
            (StatusCode::OK, json!({ "experiments": experiments }))
        }
        Ok(Err(err)) => internal_error(&err.to_string()),
        Err(reply) => reply,
    };
    state.finish(&meta, None, reply)
}

/// Reports whether the store is reachable.
async fn readiness<T, S>(State(state): State<Arc<ApiState<T, S>>>) -> Response
where
    T: RpcTransport + Send + Sync + 'static,
    S: ExperimentStore + Send + Sync + 'static,
{
    let failure = match blocking(&state, |state| state.bench.readiness()).await {
        Ok(Ok(())) => return (StatusCode::OK, Json(json!({ "status": "ready" }))).into_response(),
        Ok(Err(err)) => err.to_string(),
        Err((_, body)) => body["error"].as_str().unwrap_or_default().to_string(),
    };
    let body = json!({ "status": "unavailable", "error": failure });
    (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
}

/// Serves static frontend files for unmatched routes.
async fn static_fallback<T, S>(
    State(state): State<Arc<ApiState<T, S>>>,
    method: Method,
    uri: Uri,
) -> Response
where
    T: Send + Sync + 'static,
    S: Send + Sync + 'static,
{
    if method != Method::GET && method != Method::HEAD {
        return frontend::not_found();
    }
    match state.frontend_dir.as_deref() {
        Some(root) => frontend::serve_asset(root, uri.path()).await,
        None => frontend::not_found(),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Runs blocking service work on the blocking thread pool.
async fn blocking<T, S, R, F>(state: &Arc<ApiState<T, S>>, work: F) -> Result<R, ApiReply>
where
    T: Send + Sync + 'static,
    S: Send + Sync + 'static,
    R: Send + 'static,
    F: FnOnce(&ApiState<T, S>) -> R + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || work(&state))
        .await
        .map_err(|_| internal_error("worker task failed"))
}

/// Parses a JSON request body.
fn parse_body<B: DeserializeOwned>(bytes: &[u8]) -> Result<B, ApiReply> {
    serde_json::from_slice(bytes).map_err(|_| bad_request(INVALID_BODY))
}

/// Returns the trimmed value when present and non-blank.
fn required(value: Option<String>) -> Option<String> {
    value.map(|text| text.trim().to_string()).filter(|text| !text.is_empty())
}

/// Returns the value unchanged when present and non-blank.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Builds a run request from a `POST /api/run` body.
fn parse_run_request(bytes: &[u8], default_iterations: u32) -> Result<RunRequest, ApiReply> {
    let body: RunBody = parse_body(bytes)?;
    let endpoint_url = required(body.server_url);
    let tool_name = non_blank(body.tool_name);
    let (Some(endpoint_url), Some(tool_name)) = (endpoint_url, tool_name) else {
        return Err(bad_request("Server URL and tool name are required"));
    };
    let arguments = match body.arguments {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(value @ Value::Object(_)) => Some(value.to_string()),
        Some(_) => return Err(bad_request(INVALID_ARGUMENTS)),
    };
    let iteration_count = parse_iterations(body.iterations.as_ref(), default_iterations)
        .ok_or_else(|| bad_request("Invalid iteration count"))?;
    Ok(RunRequest {
        endpoint_url,
        tool_name,
        arguments,
        iteration_count,
    })
}

/// Reads an iteration count from a number or numeric string.
fn parse_iterations(value: Option<&Value>, default_iterations: u32) -> Option<u32> {
    match value {
        None | Some(Value::Null) => Some(default_iterations),
        Some(Value::Number(number)) => number.as_u64().and_then(|count| u32::try_from(count).ok()),
        Some(Value::String(text)) => text.trim().parse().ok(),
        Some(_) => None,
    }
}

/// Maps a catalog failure onto an HTTP reply.
fn catalog_failure(err: CatalogError) -> ApiReply {
    match err {
        CatalogError::EndpointUnreachable(description) => internal_error(&description),
        CatalogError::RemoteRpcError {
            message,
            ..
        } => internal_error(&message),
        CatalogError::MalformedResponse {
            raw,
        } => (
            StatusCode::BAD_GATEWAY,
            json!({ "error": "Invalid response format from server", "raw": raw }),
        ),
    }
}

/// Builds a 400 reply.
fn bad_request(message: &str) -> ApiReply {
    (StatusCode::BAD_REQUEST, json!({ "error": message }))
}

/// Builds a 500 reply.
fn internal_error(message: &str) -> ApiReply {
    (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
}

// ============================================================================
// SECTION: Response Bodies
// ============================================================================

/// Renders one iteration result.
fn result_json(result: &IterationResult) -> Value {
    json!({
        "iteration": result.iteration(),
        "duration_ms": result.duration_millis,
        "status": result.status.as_str(),
        "response": result.response_text,
    })
}

/// Renders a completed run.
fn run_report_json(report: &RunReport) -> Value {
    let results: Vec<Value> = report.results.iter().map(result_json).collect();
    json!({
        "experimentId": report.experiment.id.as_str(),
        "results": results,
        "summary": report.summary,
    })
}

/// Renders a stored experiment with its results.
fn experiment_json(record: &ExperimentRecord) -> Value {
    let experiment = &record.experiment;
    let results: Vec<Value> = record.results.iter().map(result_json).collect();
    json!({
        "experiment": {
            "id": experiment.id.as_str(),
            "serverUrl": experiment.endpoint_url,
            "toolName": experiment.tool_name,
            "arguments": experiment.arguments.to_string(),
            "iterations": experiment.iteration_count,
            "timestamp": experiment.created_at.to_string(),
        },
        "results": results,
        "summary": record.summary(),
    })
}

/// Renders an experiment summary row.
fn summary_json(summary: &ExperimentSummary) -> Value {
    json!({
        "id": summary.id.as_str(),
        "serverUrl": summary.endpoint_url,
        "toolName": summary.tool_name,
        "iterations": summary.iteration_count,
        "recordedResults": summary.recorded_results,
        "timestamp": summary.created_at.to_string(),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::parse_iterations;
    use super::parse_run_request;

    #[test]
    fn iterations_accept_numbers_and_numeric_strings() {
        assert_eq!(parse_iterations(None, 10), Some(10));
        assert_eq!(parse_iterations(Some(&json!(null)), 4), Some(4));
        assert_eq!(parse_iterations(Some(&json!(0)), 10), Some(0));
        assert_eq!(parse_iterations(Some(&json!(" 7 ")), 10), Some(7));
        assert_eq!(parse_iterations(Some(&json!(-1)), 10), None);
        assert_eq!(parse_iterations(Some(&json!(2.5)), 10), None);
        assert_eq!(parse_iterations(Some(&json!([3])), 10), None);
    }

    #[test]
    fn run_request_requires_url_and_tool() {
        let body = br#"{"serverUrl":"http://127.0.0.1:1/mcp","toolName":"  "}"#;
        let reply = parse_run_request(body, 10).err();
        assert_eq!(reply.map(|(status, _)| status), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn run_request_accepts_object_arguments() {
        let body = br#"{"serverUrl":"http://h/mcp","toolName":"echo","arguments":{"a":1}}"#;
        let request = parse_run_request(body, 3).ok();
        let request = request.as_ref();
        assert_eq!(request.and_then(|req| req.arguments.as_deref()), Some(r#"{"a":1}"#));
        assert_eq!(request.map(|req| req.iteration_count), Some(3));
    }

    #[test]
    fn run_request_forwards_tool_name_verbatim() {
        let body = br#"{"serverUrl":" http://h/mcp ","toolName":" echo "}"#;
        let request = parse_run_request(body, 1).ok();
        let request = request.as_ref();
        assert_eq!(request.map(|req| req.tool_name.as_str()), Some(" echo "));
        assert_eq!(request.map(|req| req.endpoint_url.as_str()), Some("http://h/mcp"));
    }

    #[test]
    fn run_request_rejects_non_object_arguments() {
        let body = br#"{"serverUrl":"http://h/mcp","toolName":"echo","arguments":[1]}"#;
        let reply = parse_run_request(body, 3).err();
        assert_eq!(reply.map(|(_, body)| body), Some(json!({ "error": "Invalid JSON arguments" })));
    }
}
