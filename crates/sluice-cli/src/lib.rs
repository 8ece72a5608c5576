//! Command-line runtime for sluice.
//!
//! The module owns argument parsing, telemetry bootstrapping and the three
//! subcommands:
//!
//! - `run <GRAPH>` reads a [`GraphLiteral`] from a JSON file, builds it
//!   against the built-in catalog and prints the root results as JSON
//!   (`null` when the run was cancelled).
//! - `list` prints every built-in command grouped by catalog group.
//! - `describe <KEY>` prints one command's description as JSON.
//!
//! IO streams are injected so tests can capture the output.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::error::ErrorKind;
use serde::Serialize;
use sluice_core::{CommandCatalog, Dispatcher, GraphLiteral, Options, Outputs, Process};
use tracing::{debug, info};

mod cli;
mod errors;
mod logging;
pub mod telemetry;

use cli::{Cli, CliCommand};
use errors::AppError;
pub use logging::{LogFormat, LogFormatParseError};

/// Runs the CLI using the provided arguments and IO handles.
///
/// Help and version requests are written to `stdout` and succeed. Every
/// other failure is written to `stderr` and yields [`ExitCode::FAILURE`].
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) if is_informational(&error) => {
            return match write!(stdout, "{error}") {
                Ok(()) => ExitCode::SUCCESS,
                Err(_) => ExitCode::FAILURE,
            };
        }
        Err(error) => return report(stderr, &AppError::CliUsage(error)),
    };

    match execute(cli, stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report(stderr, &error),
    }
}

fn is_informational(error: &clap::Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    )
}

fn report<E: Write>(stderr: &mut E, error: &AppError) -> ExitCode {
    let _ = writeln!(stderr, "{error}");
    ExitCode::FAILURE
}

fn execute<W: Write>(cli: Cli, stdout: &mut W) -> Result<(), AppError> {
    telemetry::initialise(&cli.log_filter, cli.log_format)?;
    let catalog = sluice_commands::catalog()?;
    match cli.command {
        CliCommand::Run { graph, stateful } => {
            let results = run_graph(&catalog, &graph, stateful)?;
            write_json(stdout, &results)
        }
        CliCommand::List { json } => list_commands(&catalog, json, stdout),
        CliCommand::Describe { key } => {
            let description = catalog
                .get(&key)
                .ok_or_else(|| AppError::UnknownCommand(key.clone()))?;
            write_json(stdout, description)
        }
    }
}

fn run_graph(
    catalog: &CommandCatalog,
    path: &Path,
    stateful: bool,
) -> Result<Option<Outputs>, AppError> {
    let text = fs::read_to_string(path).map_err(|source| AppError::ReadGraph {
        path: path.display().to_string(),
        source,
    })?;
    let literal = GraphLiteral::from_json(&text).map_err(|source| AppError::ParseGraph {
        path: path.display().to_string(),
        source,
    })?;
    let (graph, root) = literal.build(catalog)?;
    debug!(nodes = graph.len(), %root, "graph built");

    let options = if stateful {
        literal.dispatcher().with_stateful(true)
    } else {
        literal.dispatcher()
    };
    let dispatcher = Arc::new(Dispatcher::new(options));
    let mut process = Process::new(dispatcher, graph, root, Options::new())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(AppError::Runtime)?;
    let results = runtime.block_on(process.run())?;
    info!(cancelled = results.is_none(), "graph run complete");
    Ok(results)
}

/// One row of `sluice list --json`.
#[derive(Debug, Serialize)]
struct CatalogListing<'a> {
    group: &'a str,
    key: &'a str,
    name: Option<&'a str>,
    description: Option<&'a str>,
}

fn list_commands<W: Write>(
    catalog: &CommandCatalog,
    json: bool,
    stdout: &mut W,
) -> Result<(), AppError> {
    if json {
        let listing: Vec<CatalogListing<'_>> = catalog
            .descriptions()
            .map(|(group, description)| CatalogListing {
                group,
                key: description.key().unwrap_or_default(),
                name: description.name(),
                description: description.description(),
            })
            .collect();
        return write_json(stdout, &listing);
    }

    let mut current = None;
    for (group, description) in catalog.descriptions() {
        if current != Some(group) {
            writeln!(stdout, "{group}")?;
            current = Some(group);
        }
        writeln!(
            stdout,
            "  {:<18} {}",
            description.key().unwrap_or_default(),
            description.display_name()
        )?;
    }
    Ok(())
}

fn write_json<W: Write, T: Serialize + ?Sized>(stdout: &mut W, value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(AppError::Serialise)?;
    writeln!(stdout, "{rendered}")?;
    Ok(())
}

#[cfg(test)]
mod tests;
