// crates/tool-bench-core/src/core/rpc.rs
// ============================================================================
// Module: JSON-RPC Envelope Model
// Description: JSON-RPC 2.0 request envelopes and classified call outcomes.
// Purpose: Replace ad hoc field probing with an exhaustive tagged union.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Remote endpoints answer with loosely typed JSON-RPC envelopes. This module
//! classifies each envelope exactly once into [`RpcOutcome`], so every
//! consumer matches on the same four cases:
//! - a `result` member,
//! - an `error` member (structured or bare string),
//! - neither member (malformed),
//! - no decodable envelope at all (transport failure).
//!
//! A non-null `error` member takes precedence over `result`; `"error": null`
//! is treated as absent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// JSON-RPC protocol version tag.
pub const JSONRPC_VERSION: &str = "2.0";
/// Constant request identifier used for every outbound call.
pub const JSONRPC_REQUEST_ID: u64 = 1;
/// Method name for tool discovery.
pub const METHOD_TOOLS_LIST: &str = "tools/list";
/// Method name for tool invocation.
pub const METHOD_TOOLS_CALL: &str = "tools/call";

// ============================================================================
// SECTION: Request Envelope
// ============================================================================

/// JSON-RPC 2.0 request envelope.
///
/// # Invariants
/// - `params` is omitted from the wire form entirely when `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version tag.
    pub jsonrpc: String,
    /// Method name to invoke.
    pub method: String,
    /// Request identifier.
    pub id: u64,
    /// Optional parameters payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Builds a request with the constant request identifier.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            id: JSONRPC_REQUEST_ID,
            params,
        }
    }
}

// ============================================================================
// SECTION: Remote Errors
// ============================================================================

/// Error member returned by a remote endpoint.
///
/// # Invariants
/// - `raw` is the untouched `error` value from the envelope.
/// - `message` is set when `raw` is an object carrying a `message` member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRpcError {
    /// JSON-RPC error code when present and integral.
    pub code: Option<i64>,
    /// Error message when the error object carries one.
    pub message: Option<String>,
    /// Raw error value.
    pub raw: Value,
}

impl RemoteRpcError {
    /// Builds a remote error from the envelope's `error` value.
    #[must_use]
    pub fn from_value(raw: Value) -> Self {
        let (code, message) = match &raw {
            Value::Object(map) => {
                let code = map.get("code").and_then(Value::as_i64);
                let message = map.get("message").map(|value| match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                });
                (code, message)
            }
            _ => (None, None),
        };
        Self {
            code,
            message,
            raw,
        }
    }

    /// Returns the human-readable description recorded for an iteration.
    ///
    /// Preference order: the `message` member, then a bare string error, then
    /// the serialized error value.
    #[must_use]
    pub fn describe(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        match &self.raw {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }

    /// Returns the message or bare string error, if either exists.
    #[must_use]
    pub fn message_text(&self) -> Option<&str> {
        match (&self.message, &self.raw) {
            (Some(message), _) => Some(message.as_str()),
            (None, Value::String(text)) => Some(text.as_str()),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Classified result of one JSON-RPC exchange.
///
/// # Invariants
/// - Exactly one variant applies to any exchange; classification happens once.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcOutcome {
    /// Envelope carried a `result` member.
    Result(Value),
    /// Envelope carried a non-null `error` member.
    RpcError(RemoteRpcError),
    /// Envelope decoded but carried neither member; holds the full envelope.
    Malformed(Value),
    /// No envelope was obtained (connection, status, timeout, or decode failure).
    TransportFailure(String),
}

impl RpcOutcome {
    /// Classifies a decoded envelope.
    #[must_use]
    pub fn from_envelope(envelope: Value) -> Self {
        let Value::Object(map) = &envelope else {
            return Self::Malformed(envelope);
        };
        if let Some(error) = map.get("error").filter(|error| !error.is_null()) {
            return Self::RpcError(RemoteRpcError::from_value(error.clone()));
        }
        if let Some(result) = map.get("result") {
            return Self::Result(result.clone());
        }
        Self::Malformed(envelope)
    }
}

// ============================================================================
// SECTION: Tool Descriptors
// ============================================================================

/// Tool descriptor advertised by `tools/list`.
///
/// # Invariants
/// - The wrapped object always carries a string `name` member.
/// - All other members are opaque and preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ToolDescriptor(Map<String, Value>);

impl ToolDescriptor {
    /// Wraps a JSON value when it is an object with a string `name`.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) if map.get("name").is_some_and(Value::is_string) => Some(Self(map)),
            _ => None,
        }
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.get("name").and_then(Value::as_str).unwrap_or_default()
    }

    /// Returns the tool description when advertised.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.0.get("description").and_then(Value::as_str)
    }

    /// Returns the advertised input schema when present.
    #[must_use]
    pub fn input_schema(&self) -> Option<&Value> {
        self.0.get("inputSchema")
    }

    /// Returns the descriptor as a JSON object.
    #[must_use]
    pub const fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ToolDescriptor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value)
            .ok_or_else(|| serde::de::Error::custom("tool descriptor requires a string name"))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
