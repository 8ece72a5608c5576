//! CLI argument definitions for sluice.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::LogFormat;

/// Command-line interface for running sluice command graphs.
#[derive(Parser, Debug)]
#[command(name = "sluice", version, about, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Tracing filter expression, for example `info` or `sluice_core=debug`.
    #[arg(
        long,
        global = true,
        env = "SLUICE_LOG_FILTER",
        default_value = "info"
    )]
    pub(crate) log_filter: String,
    /// Log output format: `compact` or `json`.
    #[arg(
        long,
        global = true,
        env = "SLUICE_LOG_FORMAT",
        default_value_t = LogFormat::Compact
    )]
    pub(crate) log_format: LogFormat,
    /// The action to perform.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Structured subcommands for the sluice CLI.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Runs the graph literal stored in a JSON file and prints the root
    /// results.
    Run {
        /// Path to the graph literal.
        #[arg(value_name = "GRAPH")]
        graph: PathBuf,
        /// Keeps the dispatcher state after the run.
        #[arg(long)]
        stateful: bool,
    },
    /// Lists the built-in commands by catalog group.
    List {
        /// Emits the listing as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Prints the description of a built-in command as JSON.
    Describe {
        /// Catalog key of the command.
        #[arg(value_name = "KEY")]
        key: String,
    },
}
