//! Domain errors raised while assembling and running command graphs.
//!
//! Configuration and dependency failures are fatal to the call that raised
//! them. Validation findings are not errors: they are returned as data by the
//! validation collaborator.

use thiserror::Error;

/// Malformed construction arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// An argument that must be a configuration object was something else.
    #[error("argument '{argument}' must be an object, got {found}")]
    NotAnObject {
        /// Name of the offending argument.
        argument: String,
        /// Kind of value that was supplied.
        found: String,
    },

    /// A mandatory option was absent.
    #[error("option '{option}' is required and must be a {expected}")]
    MissingOption {
        /// Option name.
        option: String,
        /// Expected kind of value.
        expected: String,
    },

    /// An option was present but had the wrong kind of value.
    #[error("option '{option}' must be a {expected}, got {found}")]
    InvalidOption {
        /// Option name.
        option: String,
        /// Expected kind of value.
        expected: String,
        /// Kind of value that was supplied.
        found: String,
    },

    /// A command handle does not belong to the graph it was used with.
    #[error("command #{index} is not part of this graph")]
    UnknownCommand {
        /// Index carried by the stray handle.
        index: usize,
    },

    /// Two inputs of one command share a binding name.
    #[error("command '{command}' already declares an input named '{name}'")]
    DuplicateInput {
        /// Command declaring the inputs.
        command: String,
        /// Repeated binding name.
        name: String,
    },

    /// No catalog entry exists for the requested key.
    #[error("no command registered under key '{key}'")]
    UnknownCatalogKey {
        /// Requested key.
        key: String,
    },

    /// A catalog key was registered twice.
    #[error("command key '{key}' is already registered in group '{group}'")]
    DuplicateCatalogKey {
        /// Repeated key.
        key: String,
        /// Group that already holds the key.
        group: String,
    },

    /// A graph literal referenced a node that had not been declared yet.
    #[error("graph node '{id}' is not defined before it is referenced")]
    UnknownNode {
        /// Referenced node identifier.
        id: String,
    },

    /// A graph literal declared the same node identifier twice.
    #[error("graph node '{id}' is defined more than once")]
    DuplicateNode {
        /// Repeated node identifier.
        id: String,
    },
}

impl ConfigurationError {
    /// Creates a new `MissingOption` error.
    #[must_use]
    pub fn missing_option(option: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::MissingOption {
            option: option.into(),
            expected: expected.into(),
        }
    }

    /// Creates a new `InvalidOption` error.
    #[must_use]
    pub fn invalid_option(
        option: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::InvalidOption {
            option: option.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// A required input could not find its output on the upstream command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("command '{command}' did not have the '{lookup}' output required by input '{input}'")]
pub struct DependencyError {
    /// Label of the upstream command.
    pub command: String,
    /// Output key that was looked up.
    pub lookup: String,
    /// Binding name of the failing input.
    pub input: String,
}

/// Failure raised by a command's `execute`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Generic failure with a human-readable message.
    #[error("{message}")]
    Failed {
        /// Description of the failure.
        message: String,
    },

    /// An operand could not be interpreted as a number.
    #[error("operand '{name}' must be numeric, got {found}")]
    NonNumeric {
        /// Operand name.
        name: String,
        /// Rendering of the offending value.
        found: String,
    },

    /// Key and value lists of different lengths were paired up.
    #[error("cannot create an object from {keys} keys and {values} values")]
    MismatchedPairs {
        /// Number of keys supplied.
        keys: usize,
        /// Number of values supplied.
        values: usize,
    },
}

impl CommandError {
    /// Creates a new `Failed` error.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Errors that abort a `process` or `run` call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    /// The graph or one of its parts was misconfigured.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A required input was missing from its upstream results.
    #[error(transparent)]
    Dependency(#[from] DependencyError),

    /// A command's `execute` failed.
    #[error("command '{command}' failed: {source}")]
    Execute {
        /// Label of the failing command.
        command: String,
        /// Failure reported by the command.
        #[source]
        source: CommandError,
    },
}

#[cfg(test)]
mod tests;
