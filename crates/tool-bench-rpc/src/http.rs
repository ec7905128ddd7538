// crates/tool-bench-rpc/src/http.rs
// ============================================================================
// Module: HTTP Transport
// Description: reqwest-backed JSON POST transport.
// Purpose: Deliver JSON-RPC requests and return bounded response bodies.
// Dependencies: reqwest, tool-bench-core, url
// ============================================================================

//! ## Overview
//! Each call is a single POST with JSON content and accept headers. Failures
//! are mapped onto [`TransportError`] so the core sees one uniform failure
//! signal:
//! - unsupported schemes and unparsable URLs before any request is sent,
//! - connection failures and timeouts from the client,
//! - non-2xx statuses (including unfollowed redirects) with a body preview,
//! - bodies larger than the configured limit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::ErrorKind;
use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use tool_bench_core::RpcTransport;
use tool_bench_core::TransportError;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default maximum response body size in bytes.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;
/// Default user agent string.
pub const DEFAULT_USER_AGENT: &str = "tool-bench/0.1";
/// Maximum bytes of an error body echoed in status failures.
const STATUS_PREVIEW_BYTES: u64 = 256;
/// JSON media type.
const APPLICATION_JSON: &str = "application/json";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// HTTP transport settings.
///
/// # Invariants
/// - `timeout` is non-zero.
/// - `max_response_bytes` is non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTransportConfig {
    /// Fixed timeout applied to each request.
    pub timeout: Duration,
    /// Maximum accepted response body size.
    pub max_response_bytes: usize,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Blocking HTTP transport for JSON-RPC requests.
///
/// # Invariants
/// - Redirects are never followed.
/// - Only `http` and `https` URLs are contacted.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Underlying HTTP client.
    client: Client,
    /// Maximum accepted response body size.
    max_response_bytes: usize,
}

impl HttpTransport {
    /// Builds a transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Other`] when the HTTP client cannot be built.
    pub fn new(config: &HttpTransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| TransportError::Other(err.to_string()))?;
        Ok(Self {
            client,
            max_response_bytes: config.max_response_bytes,
        })
    }

    /// Returns the configured response size limit.
    #[must_use]
    pub const fn max_response_bytes(&self) -> usize {
        self.max_response_bytes
    }
}

impl RpcTransport for HttpTransport {
    fn post_json(&self, url: &str, body: &[u8]) -> Result<Vec<u8>, TransportError> {
        let url = parse_endpoint(url)?;
        let mut response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(ACCEPT, APPLICATION_JSON)
            .body(body.to_vec())
            .send()
            .map_err(map_send_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                preview: read_preview(&mut response),
            });
        }
        read_response_limited(&mut response, self.max_response_bytes)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses an endpoint URL and enforces the scheme allowlist.
fn parse_endpoint(raw: &str) -> Result<Url, TransportError> {
    let url = Url::parse(raw).map_err(|err| TransportError::InvalidUrl(format!("{raw}: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(TransportError::InvalidUrl(format!("unsupported scheme: {scheme}"))),
    }
}

/// Maps a send failure onto the transport taxonomy.
fn map_send_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

/// Reads a short lossy preview of an error body.
fn read_preview(response: &mut Response) -> String {
    let mut buf = Vec::new();
    let _ = response.take(STATUS_PREVIEW_BYTES).read_to_end(&mut buf);
    String::from_utf8_lossy(&buf).trim().to_string()
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut Response,
    max_bytes: usize,
) -> Result<Vec<u8>, TransportError> {
    let limit_error = TransportError::TooLarge {
        limit: max_bytes,
    };
    let max_bytes_u64 = u64::try_from(max_bytes).map_err(|_| limit_error.clone())?;
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err(limit_error);
    }
    let mut buf = Vec::new();
    response.take(max_bytes_u64.saturating_add(1)).read_to_end(&mut buf).map_err(|err| {
        if err.kind() == ErrorKind::TimedOut {
            TransportError::Timeout(err.to_string())
        } else {
            TransportError::Other(format!("failed to read response: {err}"))
        }
    })?;
    if buf.len() > max_bytes {
        return Err(limit_error);
    }
    Ok(buf)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
