//! Run-state shared by every command reached from one run.
//!
//! A [`Dispatcher`] carries the `processing` flag that commands consult before
//! doing any work, and a `stateful` flag that tells a [`Process`] whether to
//! wash the dispatcher after a run. Clearing `processing` is the cooperative
//! cancellation signal: every later `process` call returns its cached results
//! without recursing or executing.
//!
//! The flags are atomics so the dispatcher can be shared as
//! `Arc<Dispatcher>` between the caller, the process and commands that steer
//! the run themselves.
//!
//! [`Process`]: crate::Process

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigurationError;
use crate::value::Options;

/// Construction options for a [`Dispatcher`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherOptions {
    stateful: bool,
}

impl DispatcherOptions {
    /// Creates options with every flag at its default.
    #[must_use]
    pub const fn new() -> Self {
        Self { stateful: false }
    }

    /// Sets whether the dispatcher keeps its state between runs.
    #[must_use]
    pub const fn with_stateful(mut self, stateful: bool) -> Self {
        self.stateful = stateful;
        self
    }

    /// Returns the configured statefulness.
    #[must_use]
    pub const fn stateful(&self) -> bool {
        self.stateful
    }

    /// Reads the recognised options out of a configuration map.
    ///
    /// Unrecognised entries are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidOption`] when `stateful` is
    /// present but not a boolean.
    pub fn from_options(options: &Options) -> Result<Self, ConfigurationError> {
        let stateful = match options.get("stateful") {
            None => false,
            Some(value) => value.as_bool().ok_or_else(|| {
                ConfigurationError::invalid_option("stateful", "boolean", value.kind())
            })?,
        };
        Ok(Self { stateful })
    }
}

/// Shared run-state carrier.
///
/// # Example
///
/// ```
/// use sluice_core::{Dispatcher, DispatcherOptions};
///
/// let dispatcher = Dispatcher::new(DispatcherOptions::new().with_stateful(true));
/// assert!(!dispatcher.is_processing());
///
/// dispatcher.start_processing().set_stateful(false);
/// assert!(dispatcher.is_processing());
///
/// dispatcher.reset();
/// assert!(!dispatcher.is_processing());
/// assert!(dispatcher.is_stateful());
/// ```
#[derive(Debug, Default)]
pub struct Dispatcher {
    processing: AtomicBool,
    stateful: AtomicBool,
    defaults: DispatcherOptions,
}

impl Dispatcher {
    /// Creates a dispatcher that is not processing.
    #[must_use]
    pub const fn new(options: DispatcherOptions) -> Self {
        Self {
            processing: AtomicBool::new(false),
            stateful: AtomicBool::new(options.stateful),
            defaults: options,
        }
    }

    /// Creates a dispatcher from a configuration map.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidOption`] when the map carries a
    /// malformed recognised option.
    pub fn from_options(options: &Options) -> Result<Self, ConfigurationError> {
        DispatcherOptions::from_options(options).map(Self::new)
    }

    /// Returns the options the dispatcher was constructed with.
    #[must_use]
    pub const fn defaults(&self) -> DispatcherOptions {
        self.defaults
    }

    /// Returns whether `reset` is suppressed between runs.
    #[must_use]
    pub fn is_stateful(&self) -> bool {
        self.stateful.load(Ordering::SeqCst)
    }

    /// Changes the statefulness for the remainder of the run.
    pub fn set_stateful(&self, stateful: bool) -> &Self {
        self.stateful.store(stateful, Ordering::SeqCst);
        self
    }

    /// Restores the post-construction state.
    pub fn reset(&self) -> &Self {
        debug!(stateful = self.defaults.stateful, "resetting dispatcher");
        self.processing.store(false, Ordering::SeqCst);
        self.stateful.store(self.defaults.stateful, Ordering::SeqCst);
        self
    }

    /// Marks a run as in progress.
    pub fn start_processing(&self) -> &Self {
        debug!("dispatcher started processing");
        self.processing.store(true, Ordering::SeqCst);
        self
    }

    /// Clears the processing flag, soft-cancelling any outstanding work.
    pub fn stop_processing(&self) -> &Self {
        debug!("dispatcher stopped processing");
        self.processing.store(false, Ordering::SeqCst);
        self
    }

    /// Returns whether a run is in progress.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }
}
