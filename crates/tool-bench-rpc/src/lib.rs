// crates/tool-bench-rpc/src/lib.rs
// ============================================================================
// Module: Tool Bench RPC Transport
// Description: Blocking HTTP transport for JSON-RPC exchanges.
// Purpose: Implement the core transport interface over reqwest.
// Dependencies: reqwest, tool-bench-core, url
// ============================================================================

//! ## Overview
//! [`HttpTransport`] posts JSON bodies to `http://` and `https://` endpoints
//! with a fixed timeout. Redirects are not followed, non-success statuses fail
//! closed, and response bodies are capped at a configured size.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod http;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use http::DEFAULT_MAX_RESPONSE_BYTES;
pub use http::DEFAULT_TIMEOUT;
pub use http::DEFAULT_USER_AGENT;
pub use http::HttpTransport;
pub use http::HttpTransportConfig;
