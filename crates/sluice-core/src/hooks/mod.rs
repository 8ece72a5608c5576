//! Collaborators injected into a command graph.
//!
//! [`Hooks`] bundles the sanitation and validation collaborators used while
//! resolving inputs together with any [`LifecycleObserver`]s that want to hear
//! about commands and processes starting and finishing.

use std::fmt;
use std::sync::Arc;

use crate::checks::{Sanitation, TypeSanitizers, TypeValidators, Validation};
use crate::command::CommandDescription;
use crate::graph::CommandId;
use crate::value::Outputs;

/// Notification about one command.
#[derive(Debug, Clone, Copy)]
pub struct CommandEvent<'a> {
    id: CommandId,
    description: &'a CommandDescription,
    results: Option<&'a Outputs>,
}

impl<'a> CommandEvent<'a> {
    pub(crate) const fn new(
        id: CommandId,
        description: &'a CommandDescription,
        results: Option<&'a Outputs>,
    ) -> Self {
        Self {
            id,
            description,
            results,
        }
    }

    /// Returns the command handle.
    #[must_use]
    pub const fn id(&self) -> CommandId {
        self.id
    }

    /// Returns the command's self-description.
    #[must_use]
    pub const fn description(&self) -> &'a CommandDescription {
        self.description
    }

    /// Returns the display name of the command.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.description.display_name()
    }

    /// Returns the results once the command has finished.
    #[must_use]
    pub const fn results(&self) -> Option<&'a Outputs> {
        self.results
    }
}

/// Notification about a whole run.
#[derive(Debug, Clone, Copy)]
pub struct ProcessEvent<'a> {
    root: CommandId,
    results: Option<&'a Outputs>,
}

impl<'a> ProcessEvent<'a> {
    pub(crate) const fn new(root: CommandId, results: Option<&'a Outputs>) -> Self {
        Self { root, results }
    }

    /// Returns the root command of the run.
    #[must_use]
    pub const fn root(&self) -> CommandId {
        self.root
    }

    /// Returns the results once the run has finished.
    #[must_use]
    pub const fn results(&self) -> Option<&'a Outputs> {
        self.results
    }
}

/// Receives lifecycle notifications. Every hook defaults to doing nothing.
pub trait LifecycleObserver: Send + Sync {
    /// Called before a command starts resolving its inputs.
    fn command_started(&self, _event: &CommandEvent<'_>) {}

    /// Called after a command has executed and cached its results.
    fn command_finished(&self, _event: &CommandEvent<'_>) {}

    /// Called when a process starts a run.
    fn process_started(&self, _event: &ProcessEvent<'_>) {}

    /// Called when a process run completes successfully.
    fn process_finished(&self, _event: &ProcessEvent<'_>) {}
}

/// Collaborators consulted while a graph runs.
///
/// The default uses the built-in type sanitizers and validators and has no
/// observers.
///
/// # Example
///
/// ```
/// use sluice_core::{Hooks, TypeSanitizers, TypeValidators};
///
/// let hooks = Hooks::default();
/// let quiet = Hooks::new(TypeSanitizers::new(), TypeValidators::new());
/// assert_eq!(hooks.observer_count(), quiet.observer_count());
/// ```
#[derive(Clone)]
pub struct Hooks {
    sanitation: Arc<dyn Sanitation>,
    validation: Arc<dyn Validation>,
    observers: Vec<Arc<dyn LifecycleObserver>>,
}

impl Hooks {
    /// Creates hooks from the given collaborators.
    #[must_use]
    pub fn new(
        sanitation: impl Sanitation + 'static,
        validation: impl Validation + 'static,
    ) -> Self {
        Self {
            sanitation: Arc::new(sanitation),
            validation: Arc::new(validation),
            observers: Vec::new(),
        }
    }

    /// Replaces the sanitation collaborator.
    #[must_use]
    pub fn with_sanitation(mut self, sanitation: impl Sanitation + 'static) -> Self {
        self.sanitation = Arc::new(sanitation);
        self
    }

    /// Replaces the validation collaborator.
    #[must_use]
    pub fn with_validation(mut self, validation: impl Validation + 'static) -> Self {
        self.validation = Arc::new(validation);
        self
    }

    /// Adds an observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Returns the sanitation collaborator.
    #[must_use]
    pub fn sanitation(&self) -> &dyn Sanitation {
        self.sanitation.as_ref()
    }

    /// Returns the validation collaborator.
    #[must_use]
    pub fn validation(&self) -> &dyn Validation {
        self.validation.as_ref()
    }

    /// Returns the number of registered observers.
    #[must_use]
    pub const fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn notify(&self, notify: impl Fn(&dyn LifecycleObserver)) {
        for observer in &self.observers {
            notify(observer.as_ref());
        }
    }
}

impl Default for Hooks {
    fn default() -> Self {
        Self::new(TypeSanitizers::with_builtins(), TypeValidators::with_builtins())
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
