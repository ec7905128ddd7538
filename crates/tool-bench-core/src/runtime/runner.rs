// crates/tool-bench-core/src/runtime/runner.rs
// ============================================================================
// Module: Experiment Runner
// Description: Sequential, timed tool invocations recorded as experiments.
// Purpose: Drive the iteration loop, classify outcomes, and persist results.
// Dependencies: crate::{core, interfaces, runtime}, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The runner validates arguments before any side effect, persists the
//! experiment, then issues exactly `iteration_count` `tools/call` requests one
//! after another. Each call is timed in isolation, classified, and written to
//! the store before the next call starts. Per-iteration failures are encoded
//! as data; only invalid arguments and store failures abort a run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Instant;

use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::core::Experiment;
use crate::core::IterationResult;
use crate::core::IterationStatus;
use crate::core::LatencySummary;
use crate::core::METHOD_TOOLS_CALL;
use crate::core::RpcOutcome;
use crate::core::RunAuditEvent;
use crate::core::RunReport;
use crate::core::RunRequest;
use crate::core::Timestamp;
use crate::interfaces::ExperimentIdSource;
use crate::interfaces::ExperimentStore;
use crate::interfaces::RpcTransport;
use crate::interfaces::RunAuditSink;
use crate::interfaces::StoreError;
use crate::runtime::ids::RandomExperimentIds;
use crate::runtime::rpc_client::RpcClient;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal run failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `InvalidArguments` is raised before any store write or network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// Argument payload is not a JSON object.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// Store rejected a write or read.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRunAuditSink;

impl RunAuditSink for NoopRunAuditSink {
    fn record(&self, _event: &RunAuditEvent) {}
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Executes experiments against a store through an RPC client.
///
/// # Invariants
/// - Iterations are strictly sequential on the calling thread.
/// - Results carry indices `0..iteration_count` in call order.
pub struct ExperimentRunner<'a, T, S> {
    /// Client used for every iteration call.
    client: &'a RpcClient<T>,
    /// Store receiving the experiment and its results.
    store: &'a S,
    /// Identifier source for new experiments.
    ids: &'a dyn ExperimentIdSource,
    /// Sink receiving run audit events.
    audit: &'a dyn RunAuditSink,
}

impl<'a, T: RpcTransport, S: ExperimentStore> ExperimentRunner<'a, T, S> {
    /// Creates a runner with random identifiers and no audit output.
    #[must_use]
    pub fn new(client: &'a RpcClient<T>, store: &'a S) -> Self {
        Self {
            client,
            store,
            ids: &RandomExperimentIds,
            audit: &NoopRunAuditSink,
        }
    }

    /// Replaces the identifier source.
    #[must_use]
    pub fn with_id_source(mut self, ids: &'a dyn ExperimentIdSource) -> Self {
        self.ids = ids;
        self
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: &'a dyn RunAuditSink) -> Self {
        self.audit = audit;
        self
    }

    /// Runs one experiment to completion.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::InvalidArguments`] before any side effect when the
    /// arguments are not a JSON object, and [`RunError::Store`] when a store
    /// write fails.
    pub fn run(&self, request: &RunRequest) -> Result<RunReport, RunError> {
        let arguments = parse_arguments(request.arguments.as_deref())?;
        let experiment = Experiment {
            id: self.ids.next_id(),
            endpoint_url: request.endpoint_url.clone(),
            tool_name: request.tool_name.clone(),
            arguments,
            iteration_count: request.iteration_count,
            created_at: Timestamp::now(),
        };
        self.store.create_experiment(&experiment)?;
        self.audit.record(&RunAuditEvent::ExperimentStarted {
            experiment_id: experiment.id.clone(),
            endpoint_url: experiment.endpoint_url.clone(),
            tool_name: experiment.tool_name.clone(),
            iteration_count: experiment.iteration_count,
            timestamp_ms: experiment.created_at.unix_millis(),
        });

        let params = json!({
            "name": experiment.tool_name,
            "arguments": experiment.arguments,
        });
        let mut results = Vec::new();
        for index in 0 .. experiment.iteration_count {
            let started = Instant::now();
            let outcome =
                self.client.call(&experiment.endpoint_url, METHOD_TOOLS_CALL, Some(params.clone()));
            let duration_millis = started.elapsed().as_secs_f64() * 1000.0;
            let (status, response_text) = classify(outcome);
            let result = IterationResult {
                experiment_id: experiment.id.clone(),
                index,
                duration_millis,
                status,
                response_text,
            };
            self.store.append_result(&result)?;
            self.audit.record(&RunAuditEvent::IterationCompleted {
                experiment_id: experiment.id.clone(),
                index,
                duration_ms: duration_millis,
                status,
            });
            results.push(result);
        }

        let summary = LatencySummary::from_results(&results);
        self.audit.record(&RunAuditEvent::ExperimentCompleted {
            experiment_id: experiment.id.clone(),
            success: summary.success,
            error: summary.error,
            unknown: summary.unknown,
            timestamp_ms: Timestamp::now().unix_millis(),
        });
        Ok(RunReport {
            experiment,
            results,
            summary,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses raw argument text; absent or blank text yields an empty object.
///
/// # Errors
///
/// Returns [`RunError::InvalidArguments`] when the text is not a JSON object.
pub fn parse_arguments(raw: Option<&str>) -> Result<Value, RunError> {
    let Some(text) = raw.map(str::trim).filter(|text| !text.is_empty()) else {
        return Ok(Value::Object(Map::new()));
    };
    match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(RunError::InvalidArguments("arguments must be a JSON object".to_string())),
        Err(err) => Err(RunError::InvalidArguments(err.to_string())),
    }
}

/// Maps an RPC outcome onto a stored status and response text.
fn classify(outcome: RpcOutcome) -> (IterationStatus, String) {
    match outcome {
        RpcOutcome::Result(value) => (IterationStatus::Success, value.to_string()),
        RpcOutcome::RpcError(error) => (IterationStatus::Error, error.describe()),
        RpcOutcome::TransportFailure(description) => (IterationStatus::Error, description),
        RpcOutcome::Malformed(envelope) => (IterationStatus::Unknown, envelope.to_string()),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
