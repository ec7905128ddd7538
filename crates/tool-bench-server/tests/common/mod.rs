// crates/tool-bench-server/tests/common/mod.rs
// ============================================================================
// Module: Server Test Harness
// Description: In-thread axum servers and recording audit sinks.
// Purpose: Run routers on ephemeral ports for blocking HTTP tests.
// Dependencies: axum, tokio, tool-bench-core, tool-bench-server
// ============================================================================

//! Shared helpers for tool-bench-server integration tests.

#![allow(dead_code, reason = "Helpers are shared across test binaries.")]

use std::net::TcpListener as StdTcpListener;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use axum::Router;
use tokio::runtime::Builder;
use tokio::sync::oneshot;
use tool_bench_core::RunAuditEvent;
use tool_bench_rpc::HttpTransport;
use tool_bench_rpc::HttpTransportConfig;
use tool_bench_server::ApiAuditEvent;
use tool_bench_server::AuditSink;

/// Handle for a router served on a background thread.
pub struct TestServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl TestServer {
    /// Serves `app` on an ephemeral loopback port.
    pub fn spawn(app: Router) -> Result<Self, String> {
        let listener = StdTcpListener::bind("127.0.0.1:0")
            .map_err(|err| format!("test server bind failed: {err}"))?;
        listener
            .set_nonblocking(true)
            .map_err(|err| format!("test server nonblocking failed: {err}"))?;
        let addr = listener.local_addr().map_err(|err| format!("local addr failed: {err}"))?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let join = thread::spawn(move || {
            let Ok(runtime) = Builder::new_current_thread().enable_all().build() else {
                return;
            };
            runtime.block_on(async move {
                let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                    return;
                };
                let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                });
                let _ = server.await;
            });
        });
        Ok(Self {
            base_url: format!("http://{addr}"),
            shutdown: Some(shutdown_tx),
            join: Some(join),
        })
    }

    /// Returns `http://host:port`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the base URL joined with `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Audit sink that keeps every event in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    api: Mutex<Vec<ApiAuditEvent>>,
    runs: Mutex<Vec<RunAuditEvent>>,
}

impl RecordingAuditSink {
    pub fn api_events(&self) -> Vec<ApiAuditEvent> {
        self.api.lock().map_or_else(|_| Vec::new(), |events| events.clone())
    }

    pub fn run_labels(&self) -> Vec<&'static str> {
        self.runs
            .lock()
            .map_or_else(|_| Vec::new(), |events| events.iter().map(RunAuditEvent::label).collect())
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: &ApiAuditEvent) {
        if let Ok(mut events) = self.api.lock() {
            events.push(event.clone());
        }
    }

    fn record_run(&self, event: &RunAuditEvent) {
        if let Ok(mut events) = self.runs.lock() {
            events.push(event.clone());
        }
    }
}

/// HTTP transport with a short timeout for tests.
pub fn test_transport() -> HttpTransport {
    let config = HttpTransportConfig {
        timeout: Duration::from_secs(5),
        ..HttpTransportConfig::default()
    };
    HttpTransport::new(&config).expect("http transport")
}

/// Blocking HTTP client for driving the API.
pub fn client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("reqwest client")
}

/// Returns a loopback URL on which nothing is listening.
pub fn closed_endpoint() -> String {
    let listener = StdTcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}/mcp")
}
