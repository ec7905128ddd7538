// crates/tool-bench-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests driving the tool-bench binary end to end.
// Purpose: Validate direct benchmarking commands against a live mock endpoint.
// Dependencies: tool-bench-cli binary, serde_json, tempfile
// ============================================================================
//! ## Overview
//! Spawns `tool-bench mock` as a child process, then runs `tools`, `run`,
//! `show`, and `list` against it with a temporary store. Failures must exit
//! non-zero with a message on stderr.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::net::SocketAddr;
use std::net::TcpListener;
use std::net::TcpStream;
use std::path::Path;
use std::path::PathBuf;
use std::process::Child;
use std::process::Command;
use std::process::Output;
use std::process::Stdio;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use serde_json::Value;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn tool_bench_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_tool-bench"))
}

/// Mock endpoint child process, killed on drop.
struct MockProcess {
    child: Child,
    addr: SocketAddr,
}

impl MockProcess {
    fn spawn() -> Self {
        let addr = free_addr();
        let child = Command::new(tool_bench_bin())
            .args([
                "mock",
                "--bind",
                &addr.to_string(),
                "--min-delay-ms",
                "0",
                "--max-delay-ms",
                "0",
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn mock");
        let deadline = Instant::now() + Duration::from_secs(10);
        while TcpStream::connect(addr).is_err() {
            assert!(Instant::now() < deadline, "mock endpoint did not start on {addr}");
            thread::sleep(Duration::from_millis(25));
        }
        Self {
            child,
            addr,
        }
    }

    fn endpoint(&self) -> String {
        format!("http://{}/mcp", self.addr)
    }
}

impl Drop for MockProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn free_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("addr")
}

/// Writes a config file pointing the store into `root` with audit disabled.
fn write_config(root: &Path) -> PathBuf {
    let config_path = root.join("tool-bench.toml");
    let store_path = root.join("bench.db");
    let config = format!(
        r"
[store]
path = '{}'

[runner]
default_iterations = 2

[audit]
enabled = false
",
        store_path.display()
    );
    fs::write(&config_path, config.trim()).expect("write config");
    config_path
}

fn run_cli(config: &Path, args: &[&str]) -> Output {
    Command::new(tool_bench_bin())
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("run tool-bench")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout json")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn config_check_reports_resolved_settings() {
    let root = TempDir::new().unwrap();
    let config = write_config(root.path());
    let output = run_cli(&config, &["config", "check"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("config ok: bind 127.0.0.1:"), "unexpected stdout: {stdout}");
    assert!(stdout.contains("bench.db"), "unexpected stdout: {stdout}");
}

#[test]
fn config_check_rejects_invalid_config() {
    let root = TempDir::new().unwrap();
    let config = root.path().join("tool-bench.toml");
    fs::write(&config, "[runner]\ndefault_iterations = 0\n").unwrap();
    let output = run_cli(&config, &["config", "check"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config load failed"), "unexpected stderr: {stderr}");
}

#[test]
fn tools_lists_mock_catalog() {
    let mock = MockProcess::spawn();
    let root = TempDir::new().unwrap();
    let config = write_config(root.path());
    let output = run_cli(&config, &["tools", "--endpoint", &mock.endpoint()]);
    let body = stdout_json(&output);
    let tools = body["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().map(|tool| tool["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["echo", "random_number", "error_tool"]);
}

#[test]
fn tools_fails_for_closed_endpoint() {
    let root = TempDir::new().unwrap();
    let config = write_config(root.path());
    let endpoint = format!("http://{}/mcp", free_addr());
    let output = run_cli(&config, &["tools", "--endpoint", &endpoint]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("tool listing failed"), "unexpected stderr: {stderr}");
}

#[test]
fn run_then_show_and_list() {
    let mock = MockProcess::spawn();
    let root = TempDir::new().unwrap();
    let config = write_config(root.path());
    let endpoint = mock.endpoint();

    let output = run_cli(
        &config,
        &[
            "run",
            "--endpoint",
            &endpoint,
            "--tool",
            "echo",
            "--arguments",
            r#"{"message":"hi"}"#,
            "--iterations",
            "3",
        ],
    );
    let report = stdout_json(&output);
    assert_eq!(report["experiment"]["tool_name"], "echo");
    assert_eq!(report["experiment"]["arguments"]["message"], "hi");
    assert_eq!(report["summary"]["iterations"], 3);
    assert_eq!(report["summary"]["success"], 3);
    let results = report["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|result| result["status"] == "success"));
    let id = report["experiment"]["id"].as_str().unwrap().to_string();

    let shown = stdout_json(&run_cli(&config, &["show", "--id", &id]));
    assert_eq!(shown["experiment"], report["experiment"]);
    assert_eq!(shown["results"], report["results"]);
    assert_eq!(shown["summary"]["success"], 3);

    let listed = stdout_json(&run_cli(&config, &["list"]));
    let experiments = listed["experiments"].as_array().unwrap();
    assert_eq!(experiments.len(), 1);
    assert_eq!(experiments[0]["id"], id.as_str());
    assert_eq!(experiments[0]["recorded_results"], 3);
}

#[test]
fn run_uses_configured_default_iterations() {
    let mock = MockProcess::spawn();
    let root = TempDir::new().unwrap();
    let config = write_config(root.path());
    let output =
        run_cli(&config, &["run", "--endpoint", &mock.endpoint(), "--tool", "error_tool"]);
    let report = stdout_json(&output);
    assert_eq!(report["summary"]["iterations"], 2);
    assert_eq!(report["summary"]["error"], 2);
    assert_eq!(report["results"][0]["response_text"], "This tool always fails");
}

#[test]
fn run_rejects_invalid_arguments_without_storing() {
    let mock = MockProcess::spawn();
    let root = TempDir::new().unwrap();
    let config = write_config(root.path());
    let output = run_cli(
        &config,
        &["run", "--endpoint", &mock.endpoint(), "--tool", "echo", "--arguments", "{not json"],
    );
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid arguments"), "unexpected stderr: {stderr}");

    let listed = stdout_json(&run_cli(&config, &["list"]));
    assert_eq!(listed["experiments"].as_array().unwrap().len(), 0);
}

#[test]
fn show_unknown_experiment_fails() {
    let root = TempDir::new().unwrap();
    let config = write_config(root.path());
    let output = run_cli(&config, &["show", "--id", "missing"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"), "unexpected stderr: {stderr}");
}
