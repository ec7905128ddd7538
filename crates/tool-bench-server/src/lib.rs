// crates/tool-bench-server/src/lib.rs
// ============================================================================
// Module: Tool Bench Server Library
// Description: HTTP front end, audit sinks, and mock tool endpoint.
// Purpose: Serve the benchmarking API over HTTP with JSON-lines auditing.
// Dependencies: axum, tokio, serde_json, tool-bench-{core,rpc,store-sqlite,config}
// ============================================================================

//! ## Overview
//! The server crate is a thin async shell around the synchronous
//! [`tool_bench_core::ToolBench`] service. Handlers parse JSON bodies, hand
//! the blocking work to `spawn_blocking`, and map outcomes onto HTTP status
//! codes. A separate mock endpoint speaks just enough JSON-RPC to exercise
//! the benchmark end to end.
//!
//! Security posture: request bodies are untrusted and bounded; static file
//! paths are confined to the configured frontend directory.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api;
pub mod audit;
pub mod frontend;
pub mod mock;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use api::ApiState;
pub use api::build_router;
pub use audit::ApiAuditEvent;
pub use audit::ApiOutcome;
pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::RunAuditForwarder;
pub use audit::StderrAuditSink;
pub use audit::audit_sink_from_config;
pub use mock::MockToolConfig;
pub use mock::mock_router;
pub use mock::serve_mock;
pub use server::ServerError;
pub use server::ToolBenchServer;
