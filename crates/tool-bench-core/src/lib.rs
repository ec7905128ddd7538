// crates/tool-bench-core/src/lib.rs
// ============================================================================
// Module: Tool Bench Core Library
// Description: Public API surface for the Tool Bench core.
// Purpose: Expose the experiment model, collaborator interfaces, and runtime.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Tool Bench core issues repeated, timed JSON-RPC `tools/call` invocations
//! against a remote tool-serving endpoint and records every iteration as a
//! durable, replayable experiment. It owns no network or storage code:
//! transports and stores plug in through the traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::ExperimentIdSource;
pub use interfaces::ExperimentStore;
pub use interfaces::RpcTransport;
pub use interfaces::RunAuditSink;
pub use interfaces::StoreError;
pub use interfaces::TransportError;
pub use runtime::CatalogError;
pub use runtime::ExperimentRunner;
pub use runtime::InMemoryExperimentStore;
pub use runtime::NoopRunAuditSink;
pub use runtime::RandomExperimentIds;
pub use runtime::RpcClient;
pub use runtime::RunError;
pub use runtime::ToolBench;
pub use runtime::list_tools;
