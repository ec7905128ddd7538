// crates/tool-bench-config/src/lib.rs
// ============================================================================
// Module: Tool Bench Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for tool-bench.toml semantics.
// Dependencies: serde, thiserror, toml, tool-bench-rpc, tool-bench-store-sqlite
// ============================================================================

//! ## Overview
//! `tool-bench-config` defines the configuration model for the Tool Bench
//! server and CLI. Loading is strict and fail-closed: unknown fields,
//! oversized files, non-UTF-8 input, and out-of-range values are rejected.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
