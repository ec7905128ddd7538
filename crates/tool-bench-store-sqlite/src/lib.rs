// crates/tool-bench-store-sqlite/src/lib.rs
// ============================================================================
// Module: Tool Bench SQLite Store
// Description: Durable ExperimentStore backed by SQLite WAL.
// Purpose: Persist experiments and iteration results across restarts.
// Dependencies: rusqlite, serde, serde_json, thiserror, tool-bench-core
// ============================================================================

//! ## Overview
//! [`SqliteExperimentStore`] implements [`tool_bench_core::ExperimentStore`]
//! on `SQLite`. Writes go through a single mutex-guarded connection, one
//! transaction per write; reads use a small round-robin connection pool.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteExperimentStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
