// crates/tool-bench-core/src/core/audit.rs
// ============================================================================
// Module: Run Audit Events
// Description: Structured audit events emitted by the experiment runner.
// Purpose: Provide JSON-lines friendly records of run progress.
// Dependencies: crate::core::{experiment, identifiers}, serde
// ============================================================================

//! ## Overview
//! The runner emits one event when an experiment is created, one per
//! completed iteration, and one when the loop finishes. Events serialize as
//! flat JSON objects tagged by an `event` field so sinks can write them as
//! JSON lines without further shaping.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::experiment::IterationStatus;
use crate::core::identifiers::ExperimentId;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Audit event emitted during an experiment run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunAuditEvent {
    /// Experiment record was persisted and iterations are about to start.
    ExperimentStarted {
        /// Experiment identifier.
        experiment_id: ExperimentId,
        /// Target endpoint URL.
        endpoint_url: String,
        /// Tool under test.
        tool_name: String,
        /// Planned iteration count.
        iteration_count: u32,
        /// Event time in unix milliseconds.
        timestamp_ms: i64,
    },
    /// One iteration was classified and persisted.
    IterationCompleted {
        /// Experiment identifier.
        experiment_id: ExperimentId,
        /// Zero-based iteration index.
        index: u32,
        /// Call duration in milliseconds.
        duration_ms: f64,
        /// Outcome classification.
        status: IterationStatus,
    },
    /// All iterations finished.
    ExperimentCompleted {
        /// Experiment identifier.
        experiment_id: ExperimentId,
        /// Successful iterations.
        success: u32,
        /// Failed iterations.
        error: u32,
        /// Unclassifiable iterations.
        unknown: u32,
        /// Event time in unix milliseconds.
        timestamp_ms: i64,
    },
}

impl RunAuditEvent {
    /// Returns the stable event label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ExperimentStarted {
                ..
            } => "experiment_started",
            Self::IterationCompleted {
                ..
            } => "iteration_completed",
            Self::ExperimentCompleted {
                ..
            } => "experiment_completed",
        }
    }

    /// Returns the experiment the event belongs to.
    #[must_use]
    pub const fn experiment_id(&self) -> &ExperimentId {
        match self {
            Self::ExperimentStarted {
                experiment_id, ..
            }
            | Self::IterationCompleted {
                experiment_id, ..
            }
            | Self::ExperimentCompleted {
                experiment_id, ..
            } => experiment_id,
        }
    }
}
