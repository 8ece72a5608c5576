//! CLI entrypoint for sluice.
//!
//! The binary delegates to [`sluice_cli::run`], which parses arguments,
//! installs telemetry and dispatches to the `run`, `list` and `describe`
//! subcommands.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    sluice_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
