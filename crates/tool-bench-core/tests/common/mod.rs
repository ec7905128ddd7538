// crates/tool-bench-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Support
// Description: Scripted transports and identifier sources for runtime tests.
// Purpose: Drive the RPC client and runner without a network.
// ============================================================================

//! Shared helpers for tool-bench-core integration tests.

#![allow(dead_code, reason = "Each test binary uses a different subset of helpers.")]

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;
use tool_bench_core::ExperimentId;
use tool_bench_core::ExperimentIdSource;
use tool_bench_core::RpcTransport;
use tool_bench_core::RunAuditEvent;
use tool_bench_core::RunAuditSink;
use tool_bench_core::TransportError;

/// Transport that replays scripted replies and records every request body.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<Vec<u8>, TransportError>>>,
    fallback: Option<Result<Vec<u8>, TransportError>>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl ScriptedTransport {
    /// Answers every request with the same JSON value.
    pub fn always_json(value: &Value) -> Self {
        Self {
            fallback: Some(Ok(serde_json::to_vec(value).unwrap())),
            ..Self::default()
        }
    }

    /// Answers every request with the same raw body.
    pub fn always_body(body: &[u8]) -> Self {
        Self {
            fallback: Some(Ok(body.to_vec())),
            ..Self::default()
        }
    }

    /// Fails every request with the same transport error.
    pub fn always_err(err: TransportError) -> Self {
        Self {
            fallback: Some(Err(err)),
            ..Self::default()
        }
    }

    /// Replays the given replies in order.
    pub fn sequence(replies: Vec<Result<Vec<u8>, TransportError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    /// Returns the decoded request bodies seen so far.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

impl RpcTransport for ScriptedTransport {
    fn post_json(&self, url: &str, body: &[u8]) -> Result<Vec<u8>, TransportError> {
        let request: Value = serde_json::from_slice(body).unwrap();
        self.requests.lock().unwrap().push((url.to_string(), request));
        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            return reply;
        }
        self.fallback
            .clone()
            .unwrap_or_else(|| Err(TransportError::Other("script exhausted".to_string())))
    }
}

/// Identifier source that always returns the same identifier.
pub struct FixedIds(pub &'static str);

impl ExperimentIdSource for FixedIds {
    fn next_id(&self) -> ExperimentId {
        ExperimentId::new(self.0)
    }
}

/// Audit sink that keeps every event in memory.
#[derive(Default)]
pub struct RecordingAudit {
    events: Mutex<Vec<RunAuditEvent>>,
}

impl RecordingAudit {
    /// Returns the recorded event labels.
    pub fn labels(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(RunAuditEvent::label).collect()
    }
}

impl RunAuditSink for RecordingAudit {
    fn record(&self, event: &RunAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
