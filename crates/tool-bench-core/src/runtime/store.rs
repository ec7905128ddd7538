// crates/tool-bench-core/src/runtime/store.rs
// ============================================================================
// Module: In-Memory Experiment Store
// Description: Non-durable experiment store for tests and ephemeral use.
// Purpose: Implement the experiment store contract without external storage.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The in-memory store enforces the same contract as durable stores:
//! duplicate identifiers, unknown owners, duplicate indices, and out-of-range
//! indices are rejected, and results are always read back ordered by index.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::Experiment;
use crate::core::ExperimentId;
use crate::core::ExperimentSummary;
use crate::core::IterationResult;
use crate::interfaces::ExperimentStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Store
// ============================================================================

/// Stored experiment with its results keyed by index.
#[derive(Debug, Clone)]
struct StoredExperiment {
    /// Experiment metadata.
    experiment: Experiment,
    /// Results keyed by zero-based index.
    results: BTreeMap<u32, IterationResult>,
}

/// In-memory experiment store.
///
/// # Invariants
/// - Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryExperimentStore {
    /// Experiments keyed by identifier.
    experiments: Arc<Mutex<BTreeMap<ExperimentId, StoredExperiment>>>,
}

impl InMemoryExperimentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the experiment map.
    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<ExperimentId, StoredExperiment>>, StoreError> {
        self.experiments
            .lock()
            .map_err(|_| StoreError::Db("experiment store mutex poisoned".to_string()))
    }
}

impl ExperimentStore for InMemoryExperimentStore {
    fn create_experiment(&self, experiment: &Experiment) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&experiment.id) {
            return Err(StoreError::DuplicateId(experiment.id.clone()));
        }
        guard.insert(
            experiment.id.clone(),
            StoredExperiment {
                experiment: experiment.clone(),
                results: BTreeMap::new(),
            },
        );
        drop(guard);
        Ok(())
    }

    fn append_result(&self, result: &IterationResult) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let Some(stored) = guard.get_mut(&result.experiment_id) else {
            return Err(StoreError::UnknownExperiment(result.experiment_id.clone()));
        };
        if result.index >= stored.experiment.iteration_count {
            return Err(StoreError::Invalid(format!(
                "result index {} exceeds iteration count {}",
                result.index, stored.experiment.iteration_count
            )));
        }
        if stored.results.contains_key(&result.index) {
            return Err(StoreError::DuplicateResult {
                experiment_id: result.experiment_id.clone(),
                index: result.index,
            });
        }
        stored.results.insert(result.index, result.clone());
        drop(guard);
        Ok(())
    }

    fn get_experiment(&self, id: &ExperimentId) -> Result<Option<Experiment>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.get(id).map(|stored| stored.experiment.clone()))
    }

    fn get_results(&self, id: &ExperimentId) -> Result<Vec<IterationResult>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .get(id)
            .map(|stored| stored.results.values().cloned().collect())
            .unwrap_or_default())
    }

    fn list_experiments(&self) -> Result<Vec<ExperimentSummary>, StoreError> {
        let guard = self.lock()?;
        let mut summaries: Vec<ExperimentSummary> = guard
            .values()
            .map(|stored| ExperimentSummary {
                id: stored.experiment.id.clone(),
                endpoint_url: stored.experiment.endpoint_url.clone(),
                tool_name: stored.experiment.tool_name.clone(),
                iteration_count: stored.experiment.iteration_count,
                recorded_results: u32::try_from(stored.results.len()).unwrap_or(u32::MAX),
                created_at: stored.experiment.created_at,
            })
            .collect();
        drop(guard);
        summaries.sort_by(|left, right| {
            right.created_at.cmp(&left.created_at).then_with(|| left.id.cmp(&right.id))
        });
        Ok(summaries)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }
}
