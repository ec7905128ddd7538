// crates/tool-bench-core/src/runtime/mod.rs
// ============================================================================
// Module: Tool Bench Runtime
// Description: RPC client, catalog fetcher, experiment runner, and stores.
// Purpose: Execute benchmarking runs over the collaborator interfaces.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime is synchronous. It performs one network call at a time through
//! an [`crate::RpcTransport`] and persists through an
//! [`crate::ExperimentStore`]; async front ends run it on blocking threads.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod catalog;
pub mod ids;
pub mod rpc_client;
pub mod runner;
pub mod service;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use self::catalog::CatalogError;
pub use self::catalog::list_tools;
pub use self::ids::RandomExperimentIds;
pub use self::rpc_client::RpcClient;
pub use self::runner::ExperimentRunner;
pub use self::runner::NoopRunAuditSink;
pub use self::runner::RunError;
pub use self::service::ToolBench;
pub use self::store::InMemoryExperimentStore;
