// crates/tool-bench-core/src/runtime/rpc_client.rs
// ============================================================================
// Module: RPC Client
// Description: Single-shot JSON-RPC 2.0 calls over an injected transport.
// Purpose: Turn one request into exactly one classified outcome.
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! The client frames a JSON-RPC request, posts it once through the
//! [`RpcTransport`], and decodes the body. It never retries. Failures before a
//! JSON envelope is obtained collapse into a single description string.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::JsonRpcRequest;
use crate::core::RpcOutcome;
use crate::interfaces::RpcTransport;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Failure description for bodies that are not JSON.
pub const INVALID_JSON_RESPONSE: &str = "invalid JSON response";

// ============================================================================
// SECTION: Client
// ============================================================================

/// JSON-RPC client bound to a transport.
///
/// # Invariants
/// - Holds no state between calls.
#[derive(Debug, Clone)]
pub struct RpcClient<T> {
    /// Transport used for every exchange.
    transport: T,
}

impl<T: RpcTransport> RpcClient<T> {
    /// Creates a client over the given transport.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
        }
    }

    /// Returns the underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends one request and returns the decoded envelope.
    ///
    /// # Errors
    ///
    /// Returns the failure description when the exchange fails or the body is
    /// not JSON.
    pub fn exchange(
        &self,
        endpoint_url: &str,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, String> {
        let request = JsonRpcRequest::new(method, params);
        let body = serde_json::to_vec(&request).map_err(|err| err.to_string())?;
        let response =
            self.transport.post_json(endpoint_url, &body).map_err(|err| err.to_string())?;
        serde_json::from_slice(&response).map_err(|_| INVALID_JSON_RESPONSE.to_string())
    }

    /// Sends one request and classifies the result.
    #[must_use]
    pub fn call(&self, endpoint_url: &str, method: &str, params: Option<Value>) -> RpcOutcome {
        match self.exchange(endpoint_url, method, params) {
            Ok(envelope) => RpcOutcome::from_envelope(envelope),
            Err(description) => RpcOutcome::TransportFailure(description),
        }
    }
}
