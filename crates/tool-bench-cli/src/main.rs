// crates/tool-bench-cli/src/main.rs
// ============================================================================
// Module: Tool Bench CLI Entry Point
// Description: Command dispatcher for serving, mocking, and benchmarking.
// Purpose: Run the HTTP front end or benchmark tools directly from a shell.
// Dependencies: clap, serde_json, thiserror, tokio, tool-bench-*
// ============================================================================

//! ## Overview
//! `tool-bench` wraps the benchmarking service for terminal use. Direct
//! commands (`tools`, `run`, `show`, `list`) run synchronously and print JSON
//! to stdout; `serve` and `mock` start a Tokio runtime for their HTTP
//! listeners. Errors go to stderr and exit with status 1.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tool_bench_config::ToolBenchConfig;
use tool_bench_core::ExperimentId;
use tool_bench_core::RandomExperimentIds;
use tool_bench_core::RpcClient;
use tool_bench_core::RunRequest;
use tool_bench_core::ToolBench;
use tool_bench_core::list_tools;
use tool_bench_rpc::HttpTransport;
use tool_bench_server::MockToolConfig;
use tool_bench_server::RunAuditForwarder;
use tool_bench_server::ToolBenchServer;
use tool_bench_server::audit_sink_from_config;
use tool_bench_server::serve_mock;
use tool_bench_store_sqlite::SqliteExperimentStore;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default bind address for the mock endpoint.
const DEFAULT_MOCK_BIND: &str = "127.0.0.1:8000";
/// Default lower bound of mock latency.
const DEFAULT_MOCK_MIN_DELAY_MS: u64 = 50;
/// Default upper bound of mock latency.
const DEFAULT_MOCK_MAX_DELAY_MS: u64 = 200;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "tool-bench", version, disable_help_subcommand = true)]
struct Cli {
    /// Config file path (overrides `TOOL_BENCH_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP front end.
    Serve(ServeCommand),
    /// Start the mock JSON-RPC tool endpoint.
    Mock(MockCommand),
    /// List the tools advertised by an endpoint.
    Tools(ToolsCommand),
    /// Run an experiment and print the report.
    Run(RunCommand),
    /// Print a stored experiment with its results.
    Show(ShowCommand),
    /// List stored experiments, newest first.
    List,
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `serve`.
#[derive(clap::Args, Debug)]
struct ServeCommand {
    /// Bind address override.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

/// Arguments for `mock`.
#[derive(clap::Args, Debug)]
struct MockCommand {
    /// Bind address.
    #[arg(long, value_name = "ADDR", default_value = DEFAULT_MOCK_BIND)]
    bind: SocketAddr,
    /// Lower bound of simulated latency in milliseconds.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MOCK_MIN_DELAY_MS)]
    min_delay_ms: u64,
    /// Upper bound of simulated latency in milliseconds.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MOCK_MAX_DELAY_MS)]
    max_delay_ms: u64,
}

/// Arguments for `tools`.
#[derive(clap::Args, Debug)]
struct ToolsCommand {
    /// JSON-RPC endpoint URL.
    #[arg(long, value_name = "URL")]
    endpoint: String,
}

/// Arguments for `run`.
#[derive(clap::Args, Debug)]
struct RunCommand {
    /// JSON-RPC endpoint URL.
    #[arg(long, value_name = "URL")]
    endpoint: String,
    /// Tool to invoke.
    #[arg(long, value_name = "NAME")]
    tool: String,
    /// Tool arguments as a JSON object.
    #[arg(long, value_name = "JSON")]
    arguments: Option<String>,
    /// Iteration count (defaults to `runner.default_iterations`).
    #[arg(long, value_name = "N")]
    iterations: Option<u32>,
}

/// Arguments for `show`.
#[derive(clap::Args, Debug)]
struct ShowCommand {
    /// Experiment identifier.
    #[arg(long, value_name = "ID")]
    id: String,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the resolved configuration.
    Check,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Service over the production collaborators.
type BenchService = ToolBench<HttpTransport, SqliteExperimentStore>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Dispatches the parsed command.
fn run(cli: Cli) -> CliResult<ExitCode> {
    let config_path = cli.config;
    match cli.command {
        Commands::Serve(command) => command_serve(config_path, command),
        Commands::Mock(command) => command_mock(&command),
        Commands::Tools(command) => command_tools(config_path, &command),
        Commands::Run(command) => command_run(config_path, command),
        Commands::Show(command) => command_show(config_path, command),
        Commands::List => command_list(config_path),
        Commands::Config {
            command: ConfigCommand::Check,
        } => command_config_check(config_path),
    }
}

// ============================================================================
// SECTION: Server Commands
// ============================================================================

/// Runs the HTTP front end.
fn command_serve(config_path: Option<PathBuf>, command: ServeCommand) -> CliResult<ExitCode> {
    let mut config = load_config(config_path)?;
    if let Some(bind) = command.bind {
        config.server.bind = bind;
    }
    let server = ToolBenchServer::from_config(&config)
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    let runtime = build_runtime()?;
    let outcome = runtime.block_on(server.serve());
    drop(runtime);
    outcome.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Runs the mock tool endpoint.
fn command_mock(command: &MockCommand) -> CliResult<ExitCode> {
    let config = MockToolConfig::from_millis(command.min_delay_ms, command.max_delay_ms);
    let runtime = build_runtime()?;
    runtime
        .block_on(serve_mock(command.bind, config))
        .map_err(|err| CliError::new(format!("mock server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Builds the multi-threaded runtime for HTTP listeners.
fn build_runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| CliError::new(format!("runtime init failed: {err}")))
}

// ============================================================================
// SECTION: Benchmark Commands
// ============================================================================

/// Prints the tools advertised by an endpoint.
fn command_tools(config_path: Option<PathBuf>, command: &ToolsCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let client = RpcClient::new(build_transport(&config)?);
    let tools = list_tools(&client, &command.endpoint)
        .map_err(|err| CliError::new(format!("tool listing failed: {err}")))?;
    write_json(&json!({ "tools": tools }))?;
    Ok(ExitCode::SUCCESS)
}

/// Runs an experiment and prints the report.
fn command_run(config_path: Option<PathBuf>, command: RunCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let bench = open_bench(&config)?;
    let audit = audit_sink_from_config(&config.audit)
        .map_err(|err| CliError::new(format!("audit sink init failed: {err}")))?;
    let request = RunRequest {
        endpoint_url: command.endpoint,
        tool_name: command.tool,
        arguments: command.arguments,
        iteration_count: command.iterations.unwrap_or(config.runner.default_iterations),
    };
    let forwarder = RunAuditForwarder::new(audit.as_ref());
    let report = bench
        .run_with(&request, &RandomExperimentIds, &forwarder)
        .map_err(|err| CliError::new(format!("run failed: {err}")))?;
    write_json(&report)?;
    Ok(ExitCode::SUCCESS)
}

/// Prints a stored experiment.
fn command_show(config_path: Option<PathBuf>, command: ShowCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let bench = open_bench(&config)?;
    let record = bench
        .get_experiment(&ExperimentId::new(command.id))
        .map_err(|err| CliError::new(err.to_string()))?;
    let summary = record.summary();
    write_json(&json!({
        "experiment": record.experiment,
        "results": record.results,
        "summary": summary,
    }))?;
    Ok(ExitCode::SUCCESS)
}

/// Prints stored experiment summaries.
fn command_list(config_path: Option<PathBuf>) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let bench = open_bench(&config)?;
    let experiments = bench.list_experiments().map_err(|err| CliError::new(err.to_string()))?;
    write_json(&json!({ "experiments": experiments }))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Validates configuration and reports the outcome.
fn command_config_check(config_path: Option<PathBuf>) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    write_stdout_line(&format!(
        "config ok: bind {}, store {}",
        config.server.bind,
        config.store.path.display()
    ))
    .map_err(|err| output_error("stdout", &err))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads configuration from the resolved path.
fn load_config(config_path: Option<PathBuf>) -> CliResult<ToolBenchConfig> {
    ToolBenchConfig::load(config_path.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))
}

/// Builds the HTTP transport from configuration.
fn build_transport(config: &ToolBenchConfig) -> CliResult<HttpTransport> {
    HttpTransport::new(&config.rpc.transport_config())
        .map_err(|err| CliError::new(format!("transport init failed: {err}")))
}

/// Opens the configured store and builds the service.
fn open_bench(config: &ToolBenchConfig) -> CliResult<BenchService> {
    let transport = build_transport(config)?;
    let store = SqliteExperimentStore::open(&config.store.sqlite_config())
        .map_err(|err| CliError::new(format!("store open failed: {err}")))?;
    Ok(ToolBench::new(transport, store))
}

/// Writes a value to stdout as pretty JSON.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("json serialization failed: {err}")))?;
    write_stdout_line(&text).map_err(|err| output_error("stdout", &err))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output failure.
fn output_error(stream: &str, error: &std::io::Error) -> CliError {
    CliError::new(format!("failed to write {stream}: {error}"))
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
