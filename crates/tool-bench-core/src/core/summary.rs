// crates/tool-bench-core/src/core/summary.rs
// ============================================================================
// Module: Latency Summary
// Description: Aggregate latency and outcome statistics for a run.
// Purpose: Give front ends a compact view of an experiment's results.
// Dependencies: crate::core::experiment, serde
// ============================================================================

//! ## Overview
//! Summaries are derived, never stored. They are recomputed from the ordered
//! result sequence whenever an experiment is reported.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::experiment::IterationResult;
use crate::core::experiment::IterationStatus;

// ============================================================================
// SECTION: Latency Summary
// ============================================================================

/// Latency and outcome statistics over a result sequence.
///
/// # Invariants
/// - `success + error + unknown == iterations`.
/// - Duration statistics are `None` exactly when `iterations == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    /// Number of results summarized.
    pub iterations: u32,
    /// Results classified as success.
    pub success: u32,
    /// Results classified as error.
    pub error: u32,
    /// Results classified as unknown.
    pub unknown: u32,
    /// Fastest call in milliseconds.
    pub min_ms: Option<f64>,
    /// Slowest call in milliseconds.
    pub max_ms: Option<f64>,
    /// Mean call duration in milliseconds.
    pub mean_ms: Option<f64>,
}

impl LatencySummary {
    /// Computes the summary for a result sequence.
    #[must_use]
    pub fn from_results(results: &[IterationResult]) -> Self {
        let mut summary = Self {
            iterations: 0,
            success: 0,
            error: 0,
            unknown: 0,
            min_ms: None,
            max_ms: None,
            mean_ms: None,
        };
        let mut total = 0.0_f64;
        for result in results {
            summary.iterations = summary.iterations.saturating_add(1);
            match result.status {
                IterationStatus::Success => summary.success = summary.success.saturating_add(1),
                IterationStatus::Error => summary.error = summary.error.saturating_add(1),
                IterationStatus::Unknown => summary.unknown = summary.unknown.saturating_add(1),
            }
            let duration = result.duration_millis;
            total += duration;
            summary.min_ms = Some(summary.min_ms.map_or(duration, |min| min.min(duration)));
            summary.max_ms = Some(summary.max_ms.map_or(duration, |max| max.max(duration)));
        }
        if summary.iterations > 0 {
            summary.mean_ms = Some(total / f64::from(summary.iterations));
        }
        summary
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::LatencySummary;
    use crate::core::experiment::IterationResult;
    use crate::core::experiment::IterationStatus;
    use crate::core::identifiers::ExperimentId;

    fn result(index: u32, duration_millis: f64, status: IterationStatus) -> IterationResult {
        IterationResult {
            experiment_id: ExperimentId::new("abcd1234"),
            index,
            duration_millis,
            status,
            response_text: String::new(),
        }
    }

    #[test]
    fn empty_results_have_no_latency() {
        let summary = LatencySummary::from_results(&[]);
        assert_eq!(summary.iterations, 0);
        assert_eq!(summary.mean_ms, None);
        assert_eq!(summary.min_ms, None);
    }

    #[test]
    fn counts_and_latency_are_aggregated() {
        let summary = LatencySummary::from_results(&[
            result(0, 10.0, IterationStatus::Success),
            result(1, 30.0, IterationStatus::Error),
            result(2, 20.0, IterationStatus::Unknown),
        ]);
        assert_eq!((summary.success, summary.error, summary.unknown), (1, 1, 1));
        assert_eq!(summary.min_ms, Some(10.0));
        assert_eq!(summary.max_ms, Some(30.0));
        assert_eq!(summary.mean_ms, Some(20.0));
    }
}
