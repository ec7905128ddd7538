// crates/tool-bench-core/src/interfaces/mod.rs
// ============================================================================
// Module: Tool Bench Interfaces
// Description: Backend-agnostic interfaces for transport, storage, and audit.
// Purpose: Define the contract surfaces consumed by the Tool Bench runtime.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how Tool Bench integrates with external systems without
//! embedding backend-specific details. The runtime only ever sees these
//! traits: an HTTP transport for JSON-RPC exchanges, a durable experiment
//! store, an identifier source, and an audit sink.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::Experiment;
use crate::core::ExperimentId;
use crate::core::ExperimentSummary;
use crate::core::IterationResult;
use crate::core::RunAuditEvent;

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Transport errors for JSON-RPC exchanges.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Every variant is a uniform failure signal distinct from a response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Endpoint URL could not be parsed or uses an unsupported scheme.
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),
    /// Connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),
    /// Request exceeded the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),
    /// Endpoint answered with a non-success HTTP status.
    #[error("http status {status}: {preview}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Leading bytes of the response body, lossily decoded.
        preview: String,
    },
    /// Response body exceeded the configured size limit.
    #[error("response exceeds size limit of {limit} bytes")]
    TooLarge {
        /// Maximum allowed body size in bytes.
        limit: usize,
    },
    /// Any other transport failure.
    #[error("transport error: {0}")]
    Other(String),
}

/// Backend-agnostic JSON POST transport.
pub trait RpcTransport {
    /// Posts a JSON body to `url` and returns the raw response body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] for connection failures, timeouts, non-2xx
    /// statuses, and oversized bodies.
    fn post_json(&self, url: &str, body: &[u8]) -> Result<Vec<u8>, TransportError>;
}

impl<T: RpcTransport + ?Sized> RpcTransport for &T {
    fn post_json(&self, url: &str, body: &[u8]) -> Result<Vec<u8>, TransportError> {
        (**self).post_json(url, body)
    }
}

// ============================================================================
// SECTION: Experiment Store
// ============================================================================

/// Experiment store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// An experiment with the same identifier already exists.
    #[error("experiment store duplicate id: {0}")]
    DuplicateId(ExperimentId),
    /// A result references an experiment that does not exist.
    #[error("experiment store unknown experiment: {0}")]
    UnknownExperiment(ExperimentId),
    /// Requested experiment does not exist.
    #[error("experiment store not found: {0}")]
    NotFound(ExperimentId),
    /// A result for the same experiment and index already exists.
    #[error("experiment store duplicate result: {experiment_id} index {index}")]
    DuplicateResult {
        /// Owning experiment.
        experiment_id: ExperimentId,
        /// Conflicting zero-based index.
        index: u32,
    },
    /// Store I/O error.
    #[error("experiment store io error: {0}")]
    Io(String),
    /// Storage backend reported an error.
    #[error("experiment store db error: {0}")]
    Db(String),
    /// Stored data fails integrity checks.
    #[error("experiment store corruption: {0}")]
    Corrupt(String),
    /// Stored schema version is incompatible.
    #[error("experiment store version mismatch: {0}")]
    VersionMismatch(String),
    /// Input data is invalid.
    #[error("experiment store invalid data: {0}")]
    Invalid(String),
}

/// Durable store of experiments and their ordered results.
///
/// # Invariants
/// - Records are append-only; no update or delete is exposed.
/// - Results are always returned in ascending index order.
pub trait ExperimentStore {
    /// Persists a new experiment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] when the identifier exists.
    fn create_experiment(&self, experiment: &Experiment) -> Result<(), StoreError>;

    /// Appends one iteration result.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownExperiment`] when the owner is missing,
    /// [`StoreError::DuplicateResult`] when the index was already written, and
    /// [`StoreError::Invalid`] when the index is out of range.
    fn append_result(&self, result: &IterationResult) -> Result<(), StoreError>;

    /// Loads an experiment by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get_experiment(&self, id: &ExperimentId) -> Result<Option<Experiment>, StoreError>;

    /// Loads all results for an experiment ordered by index.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get_results(&self, id: &ExperimentId) -> Result<Vec<IterationResult>, StoreError>;

    /// Lists experiment summaries, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list_experiments(&self) -> Result<Vec<ExperimentSummary>, StoreError>;

    /// Reports store readiness for liveness/readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl<S: ExperimentStore + ?Sized> ExperimentStore for std::sync::Arc<S> {
    fn create_experiment(&self, experiment: &Experiment) -> Result<(), StoreError> {
        (**self).create_experiment(experiment)
    }

    fn append_result(&self, result: &IterationResult) -> Result<(), StoreError> {
        (**self).append_result(result)
    }

    fn get_experiment(&self, id: &ExperimentId) -> Result<Option<Experiment>, StoreError> {
        (**self).get_experiment(id)
    }

    fn get_results(&self, id: &ExperimentId) -> Result<Vec<IterationResult>, StoreError> {
        (**self).get_results(id)
    }

    fn list_experiments(&self) -> Result<Vec<ExperimentSummary>, StoreError> {
        (**self).list_experiments()
    }

    fn readiness(&self) -> Result<(), StoreError> {
        (**self).readiness()
    }
}

// ============================================================================
// SECTION: Identifier Source
// ============================================================================

/// Source of fresh experiment identifiers.
pub trait ExperimentIdSource {
    /// Returns a new identifier.
    fn next_id(&self) -> ExperimentId;
}

// ============================================================================
// SECTION: Audit Sink
// ============================================================================

/// Receiver for run audit events.
pub trait RunAuditSink {
    /// Records an audit event. Implementations must not fail the run.
    fn record(&self, event: &RunAuditEvent);
}
