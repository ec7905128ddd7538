// crates/tool-bench-core/src/core/experiment.rs
// ============================================================================
// Module: Experiment Model
// Description: Experiments, iteration results, and run requests/reports.
// Purpose: Define the durable record of a benchmarking run.
// Dependencies: crate::core::{identifiers, summary, time}, serde, serde_json
// ============================================================================

//! ## Overview
//! An [`Experiment`] is one configured benchmarking run against a single tool
//! on a single endpoint. Each invocation produces exactly one
//! [`IterationResult`]. Results are keyed by zero-based index and always read
//! back in index order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::ExperimentId;
use crate::core::summary::LatencySummary;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Experiment
// ============================================================================

/// A configured benchmarking run.
///
/// # Invariants
/// - `arguments` is always a JSON object.
/// - `iteration_count` may be zero; such experiments hold no results.
/// - Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    /// Unique experiment identifier.
    pub id: ExperimentId,
    /// Target JSON-RPC endpoint URL.
    pub endpoint_url: String,
    /// Tool invoked on every iteration.
    pub tool_name: String,
    /// Arguments passed verbatim to every invocation.
    pub arguments: Value,
    /// Number of iterations planned.
    pub iteration_count: u32,
    /// Creation time.
    pub created_at: Timestamp,
}

// ============================================================================
// SECTION: Iteration Results
// ============================================================================

/// Outcome classification for one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IterationStatus {
    /// Remote endpoint returned a result.
    Success,
    /// Remote endpoint returned an error, or the exchange failed.
    Error,
    /// Envelope carried neither a result nor an error.
    Unknown,
}

impl IterationStatus {
    /// Returns the stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }

    /// Parses a stable label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "success" => Some(Self::Success),
            "error" => Some(Self::Error),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// The recorded outcome of one invocation.
///
/// # Invariants
/// - `index` is below the owning experiment's `iteration_count`.
/// - `(experiment_id, index)` is unique.
/// - `duration_millis` is non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationResult {
    /// Owning experiment.
    pub experiment_id: ExperimentId,
    /// Zero-based iteration index.
    pub index: u32,
    /// Wall-clock time spent in the call, in milliseconds.
    pub duration_millis: f64,
    /// Outcome classification.
    pub status: IterationStatus,
    /// Serialized result payload or error description.
    pub response_text: String,
}

impl IterationResult {
    /// Returns the one-based iteration number used for display.
    #[must_use]
    pub const fn iteration(&self) -> u32 {
        self.index.saturating_add(1)
    }
}

// ============================================================================
// SECTION: Aggregates
// ============================================================================

/// An experiment with all recorded results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    /// Experiment metadata.
    pub experiment: Experiment,
    /// Results ordered by ascending index.
    pub results: Vec<IterationResult>,
}

impl ExperimentRecord {
    /// Computes the latency summary for the recorded results.
    #[must_use]
    pub fn summary(&self) -> LatencySummary {
        LatencySummary::from_results(&self.results)
    }
}

/// Compact listing entry for stored experiments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentSummary {
    /// Experiment identifier.
    pub id: ExperimentId,
    /// Target endpoint URL.
    pub endpoint_url: String,
    /// Tool name.
    pub tool_name: String,
    /// Planned iteration count.
    pub iteration_count: u32,
    /// Number of results recorded so far.
    pub recorded_results: u32,
    /// Creation time.
    pub created_at: Timestamp,
}

// ============================================================================
// SECTION: Run Requests
// ============================================================================

/// Inputs for one benchmarking run.
///
/// # Invariants
/// - `arguments` is raw JSON text; `None` or blank text means `{}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Target JSON-RPC endpoint URL.
    pub endpoint_url: String,
    /// Tool to invoke.
    pub tool_name: String,
    /// Raw JSON arguments text.
    pub arguments: Option<String>,
    /// Number of sequential invocations.
    pub iteration_count: u32,
}

/// Everything produced by a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// The created experiment.
    pub experiment: Experiment,
    /// Results in iteration order.
    pub results: Vec<IterationResult>,
    /// Latency and outcome summary.
    pub summary: LatencySummary,
}

// ============================================================================
// SECTION: Tests
// ============================================================================
