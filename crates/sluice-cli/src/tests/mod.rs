//! Unit tests for the CLI runtime.

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

const SUM_GRAPH: &str = r#"{
    "root": "sum",
    "nodes": [
        { "id": "five", "command": "number", "options": { "value": 5 } },
        { "id": "ten", "command": "number", "options": { "value": 10 } },
        { "id": "sum", "command": "add_number", "inputs": [
            { "from": "five", "lookup": "value", "name": "start", "type": "number" },
            { "from": "ten", "lookup": "value", "name": "addition", "type": "number" }
        ] }
    ]
}"#;

const CANCELLED_GRAPH: &str = r#"{
    "root": "sum",
    "nodes": [
        { "id": "halt", "command": "stop_processing" },
        { "id": "sum", "command": "add_number", "inputs": [
            { "from": "halt", "lookup": "is_processing", "name": "start", "type": "number" }
        ] }
    ]
}"#;

const BROKEN_GRAPH: &str = r#"{
    "root": "sum",
    "nodes": [
        { "id": "five", "command": "number" },
        { "id": "sum", "command": "add_number", "inputs": [
            { "from": "five", "lookup": "total", "name": "start", "type": "number", "required": true }
        ] }
    ]
}"#;

struct Captured {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

fn invoke(args: &[&str]) -> Captured {
    let argv: Vec<OsString> = std::iter::once("sluice")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect();
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = run(argv, &mut stdout, &mut stderr);
    Captured {
        exit,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
        stderr: String::from_utf8(stderr).expect("stderr utf8"),
    }
}

#[fixture]
fn workspace() -> TempDir {
    tempfile::tempdir().expect("tempdir")
}

fn write_graph(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("graph.json");
    fs::write(&path, contents).expect("write graph");
    path
}

fn path_arg(path: &std::path::Path) -> &str {
    path.to_str().expect("utf8 path")
}

#[rstest]
#[case::help(&["--help"], "Usage")]
#[case::version(&["--version"], "sluice")]
fn informational_requests_go_to_stdout(#[case] args: &[&str], #[case] expected: &str) {
    let captured = invoke(args);
    assert_eq!(captured.exit, ExitCode::SUCCESS);
    assert!(captured.stdout.contains(expected), "stdout: {}", captured.stdout);
    assert!(captured.stderr.is_empty());
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    let captured = invoke(&[]);
    assert_eq!(captured.exit, ExitCode::FAILURE);
    assert!(captured.stdout.is_empty());
    assert!(captured.stderr.contains("Usage"), "stderr: {}", captured.stderr);
}

#[rstest]
fn run_prints_root_results(workspace: TempDir) {
    let graph = write_graph(&workspace, SUM_GRAPH);
    let captured = invoke(&["run", path_arg(&graph)]);

    assert_eq!(captured.exit, ExitCode::SUCCESS, "stderr: {}", captured.stderr);
    let printed: serde_json::Value =
        serde_json::from_str(&captured.stdout).expect("stdout is JSON");
    assert_eq!(printed["value"], 15.0);
}

#[rstest]
fn stateful_flag_is_accepted(workspace: TempDir) {
    let graph = write_graph(&workspace, SUM_GRAPH);
    let captured = invoke(&["run", path_arg(&graph), "--stateful"]);
    assert_eq!(captured.exit, ExitCode::SUCCESS, "stderr: {}", captured.stderr);
}

#[rstest]
fn cancelled_run_prints_null(workspace: TempDir) {
    let graph = write_graph(&workspace, CANCELLED_GRAPH);
    let captured = invoke(&["run", path_arg(&graph)]);

    assert_eq!(captured.exit, ExitCode::SUCCESS, "stderr: {}", captured.stderr);
    assert_eq!(captured.stdout.trim(), "null");
}

#[rstest]
#[case::broken(BROKEN_GRAPH, "process failed")]
#[case::malformed("{ not json", "failed to parse graph")]
#[case::unknown_command(
    r#"{ "root": "x", "nodes": [ { "id": "x", "command": "nope" } ] }"#,
    "invalid graph"
)]
fn bad_graphs_fail(workspace: TempDir, #[case] contents: &str, #[case] expected: &str) {
    let graph = write_graph(&workspace, contents);
    let captured = invoke(&["run", path_arg(&graph)]);

    assert_eq!(captured.exit, ExitCode::FAILURE);
    assert!(captured.stderr.contains(expected), "stderr: {}", captured.stderr);
}

#[rstest]
fn missing_graph_file_fails(workspace: TempDir) {
    let graph = workspace.path().join("absent.json");
    let captured = invoke(&["run", path_arg(&graph)]);

    assert_eq!(captured.exit, ExitCode::FAILURE);
    assert!(captured.stderr.contains("failed to read graph"));
}

#[test]
fn list_groups_commands() {
    let captured = invoke(&["list"]);
    assert_eq!(captured.exit, ExitCode::SUCCESS);
    let lines: Vec<&str> = captured.stdout.lines().collect();
    assert_eq!(lines.first().copied(), Some("Dispatcher"));
    assert!(lines.contains(&"Math"));
    assert!(lines.iter().any(|line| line.trim_start().starts_with("add_number")));
}

#[test]
fn list_json_names_every_command() {
    let captured = invoke(&["list", "--json"]);
    assert_eq!(captured.exit, ExitCode::SUCCESS);
    let listing: Vec<serde_json::Value> =
        serde_json::from_str(&captured.stdout).expect("stdout is JSON");
    assert_eq!(listing.len(), 13);
    assert!(
        listing
            .iter()
            .any(|row| row["key"] == "divide_number" && row["group"] == "Math")
    );
}

#[test]
fn describe_prints_description() {
    let captured = invoke(&["describe", "divide_number"]);
    assert_eq!(captured.exit, ExitCode::SUCCESS);
    let description: serde_json::Value =
        serde_json::from_str(&captured.stdout).expect("stdout is JSON");
    assert_eq!(description["name"], "Divide Number");
    assert_eq!(description["inputs"][1]["name"], "divisor");
}

#[test]
fn describe_unknown_key_fails() {
    let captured = invoke(&["describe", "nope"]);
    assert_eq!(captured.exit, ExitCode::FAILURE);
    assert!(captured.stderr.contains("unknown command 'nope'"));
}

#[rstest]
#[case("json", LogFormat::Json)]
#[case("JSON", LogFormat::Json)]
#[case("compact", LogFormat::Compact)]
fn log_format_parses_case_insensitively(#[case] text: &str, #[case] expected: LogFormat) {
    assert_eq!(LogFormat::from_str(text).expect("known format"), expected);
}

#[test]
fn log_format_rejects_unknown_names() {
    assert!(LogFormat::from_str("pretty").is_err());
    assert_eq!(LogFormat::default().to_string(), "compact");
}

#[test]
fn cli_reads_global_flags() {
    let cli = Cli::try_parse_from(["sluice", "--log-format", "json", "list"]).expect("parses");
    assert_eq!(cli.log_format, LogFormat::Json);
    assert!(matches!(cli.command, CliCommand::List { json: false }));
}

#[test]
fn malformed_filter_names_the_expression() {
    let err = telemetry::parse_filter("sluice=bogus").expect_err("unknown level");
    assert!(matches!(
        err,
        telemetry::TelemetryError::Filter { ref filter, .. } if filter == "sluice=bogus"
    ));
    assert!(err.to_string().starts_with("invalid log filter `sluice=bogus`"));
}

#[test]
fn malformed_filter_is_rejected_after_installation() {
    telemetry::initialise("info", LogFormat::Compact).expect("valid filter");
    let err = telemetry::initialise("sluice=bogus", LogFormat::Compact).expect_err("bad filter");
    assert!(matches!(err, telemetry::TelemetryError::Filter { .. }));
}

#[test]
fn later_handles_report_the_installed_subscriber() {
    let first = telemetry::initialise("sluice_core=debug", LogFormat::Json).expect("first");
    let second = telemetry::initialise("warn", LogFormat::Compact).expect("second");
    assert_eq!(first.filter(), second.filter());
    assert_eq!(first.format(), second.format());
}
