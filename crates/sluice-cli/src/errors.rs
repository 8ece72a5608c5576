//! Error types for the CLI runtime.

use std::io;

use sluice_core::{ConfigurationError, ProcessError};
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to read graph {path}: {source}")]
    ReadGraph { path: String, source: io::Error },
    #[error("failed to parse graph {path}: {source}")]
    ParseGraph {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid graph: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("failed to start the async runtime: {0}")]
    Runtime(io::Error),
    #[error("process failed: {0}")]
    Process(#[from] ProcessError),
    #[error("failed to serialise output: {0}")]
    Serialise(serde_json::Error),
    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
}
