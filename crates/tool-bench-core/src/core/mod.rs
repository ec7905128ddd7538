// crates/tool-bench-core/src/core/mod.rs
// ============================================================================
// Module: Tool Bench Core Types
// Description: Canonical experiment, iteration, and JSON-RPC structures.
// Purpose: Provide stable, serializable types shared by stores and front ends.
// Dependencies: serde, serde_json, time
// ============================================================================

//! ## Overview
//! Core types define experiments, iteration results, JSON-RPC envelopes and
//! their classified outcomes, tool descriptors, latency summaries, and run
//! audit events. These types are the canonical source of truth for every
//! derived surface (SQLite rows, HTTP JSON, CLI output).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod experiment;
pub mod identifiers;
pub mod rpc;
pub mod summary;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use self::audit::RunAuditEvent;
pub use self::experiment::Experiment;
pub use self::experiment::ExperimentRecord;
pub use self::experiment::ExperimentSummary;
pub use self::experiment::IterationResult;
pub use self::experiment::IterationStatus;
pub use self::experiment::RunReport;
pub use self::experiment::RunRequest;
pub use self::identifiers::ExperimentId;
pub use self::rpc::JSONRPC_REQUEST_ID;
pub use self::rpc::JSONRPC_VERSION;
pub use self::rpc::JsonRpcRequest;
pub use self::rpc::METHOD_TOOLS_CALL;
pub use self::rpc::METHOD_TOOLS_LIST;
pub use self::rpc::RemoteRpcError;
pub use self::rpc::RpcOutcome;
pub use self::rpc::ToolDescriptor;
pub use self::summary::LatencySummary;
pub use self::time::Timestamp;
pub use self::time::TimestampError;
