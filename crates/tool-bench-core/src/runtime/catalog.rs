// crates/tool-bench-core/src/runtime/catalog.rs
// ============================================================================
// Module: Tool Catalog Fetcher
// Description: Discovery of the tools advertised by a JSON-RPC endpoint.
// Purpose: Normalize `tools/list` responses into descriptors or hard failures.
// Dependencies: crate::{core, interfaces, runtime::rpc_client}, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Unlike iteration calls, catalog listing treats every non-conforming answer
//! as a hard failure: unreachable endpoints, remote errors, and envelopes
//! without a well-formed `result.tools` sequence are all reported to the
//! caller instead of being encoded as data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::core::METHOD_TOOLS_LIST;
use crate::core::RpcOutcome;
use crate::core::ToolDescriptor;
use crate::interfaces::RpcTransport;
use crate::runtime::rpc_client::RpcClient;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Message used when a remote error carries no usable text.
pub const UNKNOWN_RPC_ERROR: &str = "unknown rpc error";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Catalog listing failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// No JSON envelope could be obtained from the endpoint.
    #[error("endpoint unreachable: {0}")]
    EndpointUnreachable(String),
    /// Endpoint returned a JSON-RPC error.
    #[error("remote rpc error: {message}")]
    RemoteRpcError {
        /// Error code when present.
        code: Option<i64>,
        /// Error message or fallback text.
        message: String,
    },
    /// Envelope did not carry a well-formed tool list.
    #[error("malformed tools/list response")]
    MalformedResponse {
        /// Raw envelope for diagnostics.
        raw: Value,
    },
}

// ============================================================================
// SECTION: Listing
// ============================================================================

/// Lists the tools advertised by an endpoint.
///
/// # Errors
///
/// Returns [`CatalogError`] when the endpoint is unreachable, answers with a
/// JSON-RPC error, or answers with anything other than `result.tools`.
pub fn list_tools<T: RpcTransport>(
    client: &RpcClient<T>,
    endpoint_url: &str,
) -> Result<Vec<ToolDescriptor>, CatalogError> {
    let envelope = client
        .exchange(endpoint_url, METHOD_TOOLS_LIST, None)
        .map_err(CatalogError::EndpointUnreachable)?;
    match RpcOutcome::from_envelope(envelope.clone()) {
        RpcOutcome::Result(result) => {
            parse_tools(result).ok_or(CatalogError::MalformedResponse {
                raw: envelope,
            })
        }
        RpcOutcome::RpcError(error) => Err(CatalogError::RemoteRpcError {
            code: error.code,
            message: error.message_text().unwrap_or(UNKNOWN_RPC_ERROR).to_string(),
        }),
        RpcOutcome::Malformed(_) => Err(CatalogError::MalformedResponse {
            raw: envelope,
        }),
        RpcOutcome::TransportFailure(description) => {
            Err(CatalogError::EndpointUnreachable(description))
        }
    }
}

/// Extracts `tools` from a `tools/list` result, rejecting any bad descriptor.
fn parse_tools(result: Value) -> Option<Vec<ToolDescriptor>> {
    let Value::Object(mut map) = result else {
        return None;
    };
    let Some(Value::Array(tools)) = map.remove("tools") else {
        return None;
    };
    tools.into_iter().map(ToolDescriptor::from_value).collect()
}
