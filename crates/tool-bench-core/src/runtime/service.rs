// crates/tool-bench-core/src/runtime/service.rs
// ============================================================================
// Module: Tool Bench Service
// Description: Caller-facing operations over a client and a store.
// Purpose: Expose tool listing, experiment runs, and experiment reads.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! [`ToolBench`] bundles an RPC client with an experiment store and offers the
//! three operations front ends need. It holds the store handle for its whole
//! lifetime so callers open storage once and pass the service around.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ExperimentId;
use crate::core::ExperimentRecord;
use crate::core::ExperimentSummary;
use crate::core::RunReport;
use crate::core::RunRequest;
use crate::core::ToolDescriptor;
use crate::interfaces::ExperimentIdSource;
use crate::interfaces::ExperimentStore;
use crate::interfaces::RpcTransport;
use crate::interfaces::RunAuditSink;
use crate::interfaces::StoreError;
use crate::runtime::catalog::CatalogError;
use crate::runtime::catalog::list_tools;
use crate::runtime::ids::RandomExperimentIds;
use crate::runtime::rpc_client::RpcClient;
use crate::runtime::runner::ExperimentRunner;
use crate::runtime::runner::NoopRunAuditSink;
use crate::runtime::runner::RunError;

// ============================================================================
// SECTION: Service
// ============================================================================

/// Tool benchmarking service.
#[derive(Debug, Clone)]
pub struct ToolBench<T, S> {
    /// JSON-RPC client.
    client: RpcClient<T>,
    /// Experiment store.
    store: S,
}

impl<T: RpcTransport, S: ExperimentStore> ToolBench<T, S> {
    /// Creates a service from a transport and a store.
    #[must_use]
    pub const fn new(transport: T, store: S) -> Self {
        Self {
            client: RpcClient::new(transport),
            store,
        }
    }

    /// Returns the RPC client.
    #[must_use]
    pub const fn client(&self) -> &RpcClient<T> {
        &self.client
    }

    /// Returns the experiment store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Lists tools advertised by an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the listing fails.
    pub fn list_tools(&self, endpoint_url: &str) -> Result<Vec<ToolDescriptor>, CatalogError> {
        list_tools(&self.client, endpoint_url)
    }

    /// Runs an experiment without audit output.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] when arguments are invalid or the store fails.
    pub fn run(&self, request: &RunRequest) -> Result<RunReport, RunError> {
        self.run_with(request, &RandomExperimentIds, &NoopRunAuditSink)
    }

    /// Runs an experiment with an explicit identifier source and audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] when arguments are invalid or the store fails.
    pub fn run_with(
        &self,
        request: &RunRequest,
        ids: &dyn ExperimentIdSource,
        audit: &dyn RunAuditSink,
    ) -> Result<RunReport, RunError> {
        ExperimentRunner::new(&self.client, &self.store)
            .with_id_source(ids)
            .with_audit_sink(audit)
            .run(request)
    }

    /// Loads an experiment with its ordered results.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the experiment does not exist.
    pub fn get_experiment(&self, id: &ExperimentId) -> Result<ExperimentRecord, StoreError> {
        let experiment =
            self.store.get_experiment(id)?.ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let results = self.store.get_results(id)?;
        Ok(ExperimentRecord {
            experiment,
            results,
        })
    }

    /// Lists stored experiments, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    pub fn list_experiments(&self) -> Result<Vec<ExperimentSummary>, StoreError> {
        self.store.list_experiments()
    }

    /// Reports store readiness.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    pub fn readiness(&self) -> Result<(), StoreError> {
        self.store.readiness()
    }
}
