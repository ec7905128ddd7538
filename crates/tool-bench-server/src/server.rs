// crates/tool-bench-server/src/server.rs
// ============================================================================
// Module: Tool Bench Server
// Description: Wires configuration into the HTTP front end.
// Purpose: Build the service stack from config and serve it over HTTP.
// Dependencies: axum, tokio, tool-bench-{config,core,rpc,store-sqlite}
// ============================================================================

//! ## Overview
//! [`ToolBenchServer::from_config`] opens the `SQLite` store, builds the
//! HTTP transport and audit sink, and assembles the router. Construction is
//! synchronous and must happen outside the async runtime because the
//! blocking HTTP client owns its own runtime internally.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tool_bench_config::ToolBenchConfig;
use tool_bench_core::ToolBench;
use tool_bench_rpc::HttpTransport;
use tool_bench_store_sqlite::SqliteExperimentStore;

use crate::api::ApiState;
use crate::api::build_router;
use crate::audit::audit_sink_from_config;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Service state backed by the production collaborators.
pub type ProductionState = ApiState<HttpTransport, SqliteExperimentStore>;

/// Configured HTTP front end.
pub struct ToolBenchServer {
    /// Address to bind.
    bind: SocketAddr,
    /// Shared handler state.
    state: Arc<ProductionState>,
    /// Request body limit.
    max_body_bytes: usize,
}

impl ToolBenchServer {
    /// Builds the server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration is invalid or a
    /// collaborator cannot be initialized.
    pub fn from_config(config: &ToolBenchConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let bind = config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let transport = HttpTransport::new(&config.rpc.transport_config())
            .map_err(|err| ServerError::Init(err.to_string()))?;
        let store = SqliteExperimentStore::open(&config.store.sqlite_config())
            .map_err(|err| ServerError::Init(err.to_string()))?;
        let audit = audit_sink_from_config(&config.audit)
            .map_err(|err| ServerError::Init(format!("audit sink: {err}")))?;
        let state = ApiState::new(ToolBench::new(transport, store), audit)
            .with_default_iterations(config.runner.default_iterations)
            .with_frontend_dir(config.server.frontend_dir.clone());
        Ok(Self {
            bind,
            state: Arc::new(state),
            max_body_bytes: config.server.max_body_bytes,
        })
    }

    /// Returns the configured bind address.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind
    }

    /// Builds a router over the shared state.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.state), self.max_body_bytes)
    }

    /// Serves requests until the process exits.
    ///
    /// The server keeps its own handle on the shared state, so the HTTP
    /// client is released by the caller after the runtime stops.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when binding or serving fails.
    pub async fn serve(&self) -> Result<(), ServerError> {
        let listener = tokio::net::TcpListener::bind(self.bind)
            .await
            .map_err(|err| ServerError::Transport(format!("http bind failed: {err}")))?;
        let _ = writeln!(std::io::stderr(), "tool-bench: listening on http://{}", self.bind);
        if !self.bind.ip().is_loopback() {
            let _ = writeln!(
                std::io::stderr(),
                "tool-bench: warning: bound to non-loopback address {}; the API has no \
                 authentication",
                self.bind
            );
        }
        axum::serve(listener, self.router())
            .await
            .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))
    }
}
