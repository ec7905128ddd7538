// crates/tool-bench-config/src/config.rs
// ============================================================================
// Module: Tool Bench Configuration
// Description: Configuration loading and validation for Tool Bench.
// Purpose: Provide strict, fail-closed config parsing with safe defaults.
// Dependencies: serde, thiserror, toml, tool-bench-rpc, tool-bench-store-sqlite
// ============================================================================

//! ## Overview
//! Configuration is loaded from `tool-bench.toml`, resolved from an explicit
//! path, then the `TOOL_BENCH_CONFIG` environment variable, then the current
//! directory. Explicitly named files must exist; an absent implicit default
//! yields built-in defaults.
//!
//! Security posture: config input is untrusted. File size, path length, and
//! encoding are bounded, unknown fields are rejected, and every section is
//! validated before use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tool_bench_rpc::DEFAULT_MAX_RESPONSE_BYTES;
use tool_bench_rpc::DEFAULT_USER_AGENT;
use tool_bench_rpc::HttpTransportConfig;
use tool_bench_store_sqlite::SqliteStoreConfig;
use tool_bench_store_sqlite::SqliteStoreMode;
use tool_bench_store_sqlite::SqliteSyncMode;
use tool_bench_store_sqlite::store::DEFAULT_BUSY_TIMEOUT_MS;
use tool_bench_store_sqlite::store::DEFAULT_READ_POOL_SIZE;

// ============================================================================
// SECTION: Limits and Defaults
// ============================================================================

/// Default config file name.
pub const DEFAULT_CONFIG_NAME: &str = "tool-bench.toml";
/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "TOOL_BENCH_CONFIG";
/// Maximum config file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default bind address for the HTTP front end.
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
/// Default request body limit for the HTTP front end.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Default per-call RPC timeout in milliseconds.
pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 30_000;
/// Maximum per-call RPC timeout in milliseconds.
pub const MAX_RPC_TIMEOUT_MS: u64 = 600_000;
/// Maximum user agent length.
const MAX_USER_AGENT_LENGTH: usize = 256;
/// Default store file path.
pub const DEFAULT_STORE_PATH: &str = "experiments.db";
/// Maximum read pool size.
const MAX_READ_POOL_SIZE: usize = 64;
/// Default iteration count for API requests without one.
pub const DEFAULT_ITERATIONS: u32 = 10;
/// Maximum default iteration count.
const MAX_DEFAULT_ITERATIONS: u32 = 100_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Config file is not valid TOML for the model.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Config values failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Tool Bench configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolBenchConfig {
    /// HTTP front end settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// RPC transport settings.
    #[serde(default)]
    pub rpc: RpcConfig,
    /// Experiment store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Runner defaults.
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Audit output settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl ToolBenchConfig {
    /// Loads configuration using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        load_resolved(&resolved)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.rpc.validate()?;
        self.store.validate()?;
        self.runner.validate()?;
        self.audit.validate()
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP front end configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Optional directory of static frontend files.
    #[serde(default)]
    pub frontend_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            frontend_dir: None,
        }
    }
}

impl ServerConfig {
    /// Parses the bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind.trim().parse().map_err(|_| {
            ConfigError::Invalid(format!("server.bind is not a socket address: {}", self.bind))
        })
    }

    /// Validates server settings.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if let Some(dir) = &self.frontend_dir {
            validate_path_string("server.frontend_dir", &dir.to_string_lossy())?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: RPC
// ============================================================================

/// RPC transport configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RpcConfig {
    /// Fixed per-call timeout in milliseconds.
    #[serde(default = "default_rpc_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum response body size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_rpc_timeout_ms(),
            max_response_bytes: default_max_response_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

impl RpcConfig {
    /// Builds the HTTP transport configuration.
    #[must_use]
    pub fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            timeout: Duration::from_millis(self.timeout_ms),
            max_response_bytes: self.max_response_bytes,
            user_agent: self.user_agent.clone(),
        }
    }

    /// Validates RPC settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 || self.timeout_ms > MAX_RPC_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "rpc.timeout_ms must be between 1 and {MAX_RPC_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 {
            return Err(ConfigError::Invalid(
                "rpc.max_response_bytes must be greater than zero".to_string(),
            ));
        }
        let agent = self.user_agent.trim();
        if agent.is_empty() {
            return Err(ConfigError::Invalid("rpc.user_agent must be non-empty".to_string()));
        }
        if agent.len() > MAX_USER_AGENT_LENGTH {
            return Err(ConfigError::Invalid("rpc.user_agent exceeds max length".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Experiment store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// `SQLite` database path.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// Sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Read connection pool size.
    #[serde(default = "default_read_pool_size")]
    pub read_pool_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            read_pool_size: default_read_pool_size(),
        }
    }
}

impl StoreConfig {
    /// Builds the `SQLite` store configuration.
    #[must_use]
    pub fn sqlite_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: self.path.clone(),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
            read_pool_size: self.read_pool_size,
        }
    }

    /// Validates store settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("store.path", &self.path.to_string_lossy())?;
        if self.read_pool_size == 0 || self.read_pool_size > MAX_READ_POOL_SIZE {
            return Err(ConfigError::Invalid(format!(
                "store.read_pool_size must be between 1 and {MAX_READ_POOL_SIZE}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Runner defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Iterations used when a request omits a count.
    #[serde(default = "default_iterations")]
    pub default_iterations: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            default_iterations: default_iterations(),
        }
    }
}

impl RunnerConfig {
    /// Validates runner settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_iterations == 0 || self.default_iterations > MAX_DEFAULT_ITERATIONS {
            return Err(ConfigError::Invalid(format!(
                "runner.default_iterations must be between 1 and {MAX_DEFAULT_ITERATIONS}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Enables audit output.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional JSON-lines file; stderr when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", &path.to_string_lossy())?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Default body limit.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Default RPC timeout.
const fn default_rpc_timeout_ms() -> u64 {
    DEFAULT_RPC_TIMEOUT_MS
}

/// Default response limit.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

/// Default user agent.
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Default store path.
fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

/// Default busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Default read pool size.
const fn default_read_pool_size() -> usize {
    DEFAULT_READ_POOL_SIZE
}

/// Default iteration count.
const fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

/// Audit output is on unless disabled.
const fn default_audit_enabled() -> bool {
    true
}

// ============================================================================
// SECTION: Path Handling
// ============================================================================

/// Config file location and whether it was named explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedPath {
    /// Candidate config file path.
    path: PathBuf,
    /// True when named by argument or environment.
    explicit: bool,
}

/// Resolves the config path from the argument, environment, or default.
fn resolve_path(path: Option<&Path>) -> Result<ResolvedPath, ConfigError> {
    if let Some(path) = path {
        return Ok(ResolvedPath {
            path: path.to_path_buf(),
            explicit: true,
        });
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR)
        && !env_path.trim().is_empty()
    {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(ResolvedPath {
            path: PathBuf::from(env_path),
            explicit: true,
        });
    }
    Ok(ResolvedPath {
        path: PathBuf::from(DEFAULT_CONFIG_NAME),
        explicit: false,
    })
}

/// Loads a resolved config path, falling back to defaults for a missing
/// implicit file.
fn load_resolved(resolved: &ResolvedPath) -> Result<ToolBenchConfig, ConfigError> {
    validate_path(&resolved.path)?;
    if !resolved.explicit && !resolved.path.exists() {
        return Ok(ToolBenchConfig::default());
    }
    let bytes = fs::read(&resolved.path).map_err(|err| ConfigError::Io(err.to_string()))?;
    if bytes.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
    }
    let content = std::str::from_utf8(&bytes)
        .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
    ToolBenchConfig::from_toml_str(content)
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path string.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
