//! The unit of work in a command graph.
//!
//! A [`Command`] describes itself, declares default options and turns its
//! resolved inputs and options into a map of named outputs. Resolution,
//! memoisation and cancellation are handled by
//! [`CommandGraph::process`](crate::CommandGraph::process); implementors only
//! write `execute`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::checks::ValidationIssue;
use crate::dispatcher::Dispatcher;
use crate::error::CommandError;
use crate::value::{Map, Options, Outputs, Value};

/// Documentation for one option, input or output of a command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortDescription {
    name: String,
    #[serde(rename = "type")]
    port_type: String,
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
}

impl PortDescription {
    /// Creates a port description.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        port_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            port_type: port_type.into(),
            description: description.into(),
            default: None,
        }
    }

    /// Records the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Returns the port name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the type tag.
    #[must_use]
    pub const fn port_type(&self) -> &str {
        self.port_type.as_str()
    }

    /// Returns the prose description.
    #[must_use]
    pub const fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the default value, if any.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// Self-documentation consumed by catalogs, tooling and error messages.
///
/// Never read by the execution path beyond naming commands in logs and
/// errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandDescription {
    key: Option<String>,
    name: Option<String>,
    description: Option<String>,
    #[serde(default)]
    options: Vec<PortDescription>,
    #[serde(default)]
    inputs: Vec<PortDescription>,
    #[serde(default)]
    outputs: Vec<PortDescription>,
}

impl CommandDescription {
    /// Creates a description with identity fields and no ports.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: Some(key.into()),
            name: Some(name.into()),
            description: Some(description.into()),
            ..Self::default()
        }
    }

    /// Documents an option.
    #[must_use]
    pub fn with_option(mut self, option: PortDescription) -> Self {
        self.options.push(option);
        self
    }

    /// Documents an input.
    #[must_use]
    pub fn with_input(mut self, input: PortDescription) -> Self {
        self.inputs.push(input);
        self
    }

    /// Documents an output.
    #[must_use]
    pub fn with_output(mut self, output: PortDescription) -> Self {
        self.outputs.push(output);
        self
    }

    /// Returns the catalog key.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns the human-readable name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the prose description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the documented options.
    #[must_use]
    pub fn options(&self) -> &[PortDescription] {
        &self.options
    }

    /// Returns the documented inputs.
    #[must_use]
    pub fn inputs(&self) -> &[PortDescription] {
        &self.inputs
    }

    /// Returns the documented outputs.
    #[must_use]
    pub fn outputs(&self) -> &[PortDescription] {
        &self.outputs
    }

    /// Name used in logs and errors: the name, else the key, else a
    /// placeholder.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name()
            .or_else(|| self.key())
            .unwrap_or("anonymous command")
    }
}

/// Everything `execute` may read.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionContext<'a> {
    dispatcher: &'a Dispatcher,
    inputs: &'a Map,
    options: &'a Options,
    issues: &'a BTreeMap<String, Vec<ValidationIssue>>,
}

impl<'a> ExecutionContext<'a> {
    /// Bundles the state handed to `execute`.
    #[must_use]
    pub const fn new(
        dispatcher: &'a Dispatcher,
        inputs: &'a Map,
        options: &'a Options,
        issues: &'a BTreeMap<String, Vec<ValidationIssue>>,
    ) -> Self {
        Self {
            dispatcher,
            inputs,
            options,
            issues,
        }
    }

    /// Returns the dispatcher driving the run.
    #[must_use]
    pub const fn dispatcher(&self) -> &'a Dispatcher {
        self.dispatcher
    }

    /// Returns a resolved input by binding name.
    #[must_use]
    pub fn input(&self, name: &str) -> Option<&'a Value> {
        self.inputs.get(name)
    }

    /// Returns every resolved input.
    #[must_use]
    pub const fn inputs(&self) -> &'a Map {
        self.inputs
    }

    /// Returns an option by name.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&'a Value> {
        self.options.get(name)
    }

    /// Returns the merged options.
    #[must_use]
    pub const fn options(&self) -> &'a Options {
        self.options
    }

    /// Returns the resolved input of that name, falling back to the option of
    /// the same name.
    #[must_use]
    pub fn input_or_option(&self, name: &str) -> Option<&'a Value> {
        self.input(name).or_else(|| self.option(name))
    }

    /// Reads a numeric operand from the input of that name, else the option.
    ///
    /// Numeric text and booleans are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NonNumeric`] when neither source holds a
    /// value readable as a number.
    pub fn number(&self, name: &str) -> Result<f64, CommandError> {
        let value = self.input_or_option(name);
        value
            .and_then(Value::as_f64)
            .ok_or_else(|| CommandError::NonNumeric {
                name: name.to_owned(),
                found: value.map_or_else(|| String::from("nothing"), Value::to_string),
            })
    }

    /// Returns the validation issues collected for an input.
    #[must_use]
    pub fn issues(&self, name: &str) -> &'a [ValidationIssue] {
        self.issues.get(name).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` when any input collected validation issues.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        self.issues.values().any(|issues| !issues.is_empty())
    }
}

/// A node of the computation graph.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use sluice_core::{Command, CommandDescription, CommandError, ExecutionContext, Options, Outputs, Value};
///
/// struct Greeting;
///
/// #[async_trait]
/// impl Command for Greeting {
///     fn describe(&self) -> CommandDescription {
///         CommandDescription::new("greeting", "Greeting", "Greets someone.")
///     }
///
///     fn defaults(&self) -> Options {
///         Options::new().with("who", "world")
///     }
///
///     async fn execute(&self, context: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
///         let who = context.input_or_option("who").cloned().unwrap_or_default();
///         let mut outputs = Outputs::new();
///         outputs.insert("value".into(), Value::from(format!("hello {who}")));
///         Ok(outputs)
///     }
/// }
/// ```
#[async_trait]
pub trait Command: Send + Sync {
    /// Describes the command for tooling. Defaults to an empty description.
    fn describe(&self) -> CommandDescription {
        CommandDescription::default()
    }

    /// Options that constructor-supplied options are merged over.
    fn defaults(&self) -> Options {
        Options::new()
    }

    /// Produces the output map from the resolved inputs and options.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] when the inputs or options cannot be
    /// turned into outputs.
    async fn execute(&self, context: ExecutionContext<'_>) -> Result<Outputs, CommandError>;
}
