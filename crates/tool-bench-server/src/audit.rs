// crates/tool-bench-server/src/audit.rs
// ============================================================================
// Module: Server Audit Logging
// Description: Structured audit events for API requests and experiment runs.
// Purpose: Emit JSON-lines audit records without a logging framework.
// Dependencies: serde, serde_json, tool-bench-config, tool-bench-core
// ============================================================================

//! ## Overview
//! Every API request produces one [`ApiAuditEvent`]; experiment runs forward
//! their [`RunAuditEvent`]s through the same [`AuditSink`]. Sinks write one
//! JSON object per line to stderr or an append-only file, or discard events.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use tool_bench_config::AuditConfig;
use tool_bench_core::RunAuditEvent;
use tool_bench_core::RunAuditSink;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Coarse request outcome derived from the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiOutcome {
    /// 2xx response.
    Ok,
    /// 4xx response.
    ClientError,
    /// 5xx response.
    ServerError,
}

impl ApiOutcome {
    /// Classifies an HTTP status code.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 ..= 499 => Self::ClientError,
            500 ..= 599 => Self::ServerError,
            _ => Self::Ok,
        }
    }
}

/// API request audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ApiAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// HTTP method.
    pub method: &'static str,
    /// Route template.
    pub route: &'static str,
    /// Response status code.
    pub status: u16,
    /// Outcome classification.
    pub outcome: ApiOutcome,
    /// Handler duration in milliseconds.
    pub duration_ms: u128,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Experiment identifier when the request created or read one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiment_id: Option<String>,
}

/// Inputs required to construct an API audit event.
pub struct ApiAuditEventParams {
    /// HTTP method.
    pub method: &'static str,
    /// Route template.
    pub route: &'static str,
    /// Response status code.
    pub status: u16,
    /// Handler duration in milliseconds.
    pub duration_ms: u128,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Experiment identifier when known.
    pub experiment_id: Option<String>,
}

impl ApiAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ApiAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "api_request",
            timestamp_ms,
            method: params.method,
            route: params.route,
            status: params.status,
            outcome: ApiOutcome::from_status(params.status),
            duration_ms: params.duration_ms,
            request_bytes: params.request_bytes,
            experiment_id: params.experiment_id,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for API and run events.
pub trait AuditSink: Send + Sync {
    /// Record an API request event.
    fn record(&self, event: &ApiAuditEvent);

    /// Record an experiment run event.
    fn record_run(&self, event: &RunAuditEvent);
}

/// Adapter exposing an [`AuditSink`] to the experiment runner.
pub struct RunAuditForwarder<'a> {
    /// Destination sink.
    sink: &'a dyn AuditSink,
}

impl<'a> RunAuditForwarder<'a> {
    /// Wraps a sink.
    #[must_use]
    pub const fn new(sink: &'a dyn AuditSink) -> Self {
        Self {
            sink,
        }
    }
}

impl RunAuditSink for RunAuditForwarder<'_> {
    fn record(&self, event: &RunAuditEvent) {
        self.sink.record_run(event);
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &ApiAuditEvent) {
        write_json_line(&mut io::stderr(), event);
    }

    fn record_run(&self, event: &RunAuditEvent) {
        write_json_line(&mut io::stderr(), event);
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Writes one serialized event under the file lock.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(mut file) = self.file.lock() {
            write_json_line(&mut *file, event);
            let _ = file.flush();
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &ApiAuditEvent) {
        self.append(event);
    }

    fn record_run(&self, event: &RunAuditEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &ApiAuditEvent) {}

    fn record_run(&self, _event: &RunAuditEvent) {}
}

/// Builds the sink selected by configuration.
///
/// # Errors
///
/// Returns an error when the audit file cannot be opened.
pub fn audit_sink_from_config(config: &AuditConfig) -> io::Result<Arc<dyn AuditSink>> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.path {
        Some(path) => Ok(Arc::new(FileAuditSink::new(path)?)),
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

/// Serializes an event as a single JSON line; failures are dropped.
fn write_json_line<W: Write, T: Serialize>(writer: &mut W, event: &T) {
    if let Ok(payload) = serde_json::to_string(event) {
        let _ = writeln!(writer, "{payload}");
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only audit assertions."
    )]

    use std::fs;

    use tool_bench_config::AuditConfig;
    use tool_bench_core::ExperimentId;
    use tool_bench_core::RunAuditEvent;
    use tool_bench_core::RunAuditSink;

    use super::ApiAuditEvent;
    use super::ApiAuditEventParams;
    use super::ApiOutcome;
    use super::AuditSink;
    use super::FileAuditSink;
    use super::RunAuditForwarder;
    use super::audit_sink_from_config;

    #[test]
    fn outcome_follows_status_class() {
        assert_eq!(ApiOutcome::from_status(200), ApiOutcome::Ok);
        assert_eq!(ApiOutcome::from_status(413), ApiOutcome::ClientError);
        assert_eq!(ApiOutcome::from_status(502), ApiOutcome::ServerError);
    }

    #[test]
    fn file_sink_appends_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let sink = FileAuditSink::new(&path).unwrap();
        sink.record(&ApiAuditEvent::new(ApiAuditEventParams {
            method: "POST",
            route: "/api/run",
            status: 200,
            duration_ms: 12,
            request_bytes: 64,
            experiment_id: Some("0badf00d".to_string()),
        }));
        RunAuditForwarder::new(&sink).record(&RunAuditEvent::ExperimentCompleted {
            experiment_id: ExperimentId::new("0badf00d"),
            success: 1,
            error: 0,
            unknown: 0,
            timestamp_ms: 1,
        });

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> =
            text.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "api_request");
        assert_eq!(lines[0]["outcome"], "ok");
        assert_eq!(lines[1]["event"], "experiment_completed");
    }

    #[test]
    fn disabled_config_selects_noop_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.jsonl");
        let config = AuditConfig {
            enabled: false,
            path: Some(path.clone()),
        };
        let _sink = audit_sink_from_config(&config).unwrap();
        assert!(!path.exists());
    }
}
