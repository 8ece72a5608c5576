//! Structured telemetry initialisation for the CLI.
//!
//! A process installs at most one subscriber. The filter and format chosen
//! by the first successful [`initialise`] stay in effect for the lifetime of
//! the process and every later handle reports them.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, debug, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::logging::LogFormat;

static INSTALLED: OnceCell<InstalledTelemetry> = OnceCell::new();

#[derive(Debug)]
struct InstalledTelemetry {
    filter: String,
    format: LogFormat,
}

/// Handle describing the subscriber that is in effect.
#[derive(Debug, Clone, Copy)]
pub struct TelemetryHandle {
    installed: &'static InstalledTelemetry,
}

impl TelemetryHandle {
    /// Returns the filter expression the subscriber was installed with.
    #[must_use]
    pub const fn filter(&self) -> &'static str {
        self.installed.filter.as_str()
    }

    /// Returns the output format the subscriber was installed with.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.installed.format
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the log filter expression.
    #[error("invalid log filter `{filter}`: {reason}")]
    Filter {
        /// The rejected expression.
        filter: String,
        /// Why the expression was rejected.
        reason: String,
    },
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Configures the global tracing subscriber when invoked for the first time.
///
/// The filter is checked on every call, so a malformed expression is always
/// rejected. Only the first valid call installs a subscriber; later calls
/// return a handle describing the one already installed.
///
/// # Examples
///
/// ```rust
/// use sluice_cli::LogFormat;
/// use sluice_cli::telemetry;
///
/// # fn main() -> Result<(), sluice_cli::telemetry::TelemetryError> {
/// let first = telemetry::initialise("info", LogFormat::Compact)?;
/// let second = telemetry::initialise("debug", LogFormat::Json)?;
/// assert_eq!(first.format(), second.format());
/// assert_eq!(second.filter(), "info");
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for a malformed filter expression and
/// [`TelemetryError::Subscriber`] when another subscriber is already
/// installed globally.
pub fn initialise(filter: &str, format: LogFormat) -> Result<TelemetryHandle, TelemetryError> {
    let env_filter = parse_filter(filter)?;
    let installed = INSTALLED.get_or_try_init(|| {
        install_subscriber(env_filter, format)?;
        debug!(filter, %format, "telemetry installed");
        Ok::<_, TelemetryError>(InstalledTelemetry {
            filter: filter.to_owned(),
            format,
        })
    })?;
    Ok(TelemetryHandle { installed })
}

pub(crate) fn parse_filter(filter: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(filter).map_err(|error| TelemetryError::Filter {
        filter: filter.to_owned(),
        reason: error.to_string(),
    })
}

fn install_subscriber(env_filter: EnvFilter, format: LogFormat) -> Result<(), TelemetryError> {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(io::stderr)
        // Colour only on interactive terminals.
        .with_ansi(io::stderr().is_terminal())
        .with_timer(fmt::time::UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match format {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}
