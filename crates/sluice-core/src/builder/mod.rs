//! Fluent construction of command graphs.
//!
//! ```
//! use async_trait::async_trait;
//! use sluice_core::{Command, CommandError, ExecutionContext, GraphBuilder, Outputs};
//!
//! struct Pass;
//!
//! #[async_trait]
//! impl Command for Pass {
//!     async fn execute(&self, context: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
//!         Ok(context.inputs().clone())
//!     }
//! }
//!
//! let mut builder = GraphBuilder::new();
//! let source = builder.node(Pass).option("value", 5).add()?;
//! let sink = builder
//!     .node(Pass)
//!     .fetch("start")
//!     .from(source, "value")
//!     .as_type("number")
//!     .required()
//!     .end()?
//!     .add()?;
//! let graph = builder.build();
//! assert_eq!(graph.len(), 2);
//! assert!(graph.input(sink, "start").is_some_and(|input| input.is_required()));
//! # Ok::<(), sluice_core::ConfigurationError>(())
//! ```

use crate::command::Command;
use crate::error::ConfigurationError;
use crate::graph::{CommandGraph, CommandId};
use crate::hooks::Hooks;
use crate::input::{DEFAULT_INPUT_TYPE, Input, InputOptions, SanitizeSpec, ValidateSpec};
use crate::value::{Options, Value};

/// Accumulates commands into a [`CommandGraph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: CommandGraph,
}

impl GraphBuilder {
    /// Starts an empty graph with the default hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts an empty graph with the given hooks.
    #[must_use]
    pub fn with_hooks(hooks: Hooks) -> Self {
        Self {
            graph: CommandGraph::with_hooks(hooks),
        }
    }

    /// Begins describing a node for `command`.
    pub fn node<C>(&mut self, command: C) -> NodeBuilder<'_>
    where
        C: Command + 'static,
    {
        self.node_boxed(Box::new(command))
    }

    /// Begins describing a node for an already boxed command.
    pub fn node_boxed(&mut self, command: Box<dyn Command>) -> NodeBuilder<'_> {
        NodeBuilder {
            graph: &mut self.graph,
            command,
            options: Options::new(),
            inputs: Vec::new(),
        }
    }

    /// Returns the assembled graph.
    #[must_use]
    pub fn build(self) -> CommandGraph {
        self.graph
    }
}

/// A node being described; nothing is added until [`NodeBuilder::add`].
#[must_use = "a node is only added to the graph by calling `add`"]
pub struct NodeBuilder<'g> {
    graph: &'g mut CommandGraph,
    command: Box<dyn Command>,
    options: Options,
    inputs: Vec<Input>,
}

impl<'g> NodeBuilder<'g> {
    /// Sets one option.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key, value);
        self
    }

    /// Replaces all options.
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Begins describing an input bound under `name`.
    pub fn fetch(self, name: impl Into<String>) -> InputBuilder<'g> {
        InputBuilder {
            node: self,
            name: name.into(),
            source: None,
            input_type: String::from(DEFAULT_INPUT_TYPE),
            description: None,
            required: false,
            sanitize: SanitizeSpec::default(),
            validate: ValidateSpec::default(),
        }
    }

    /// Adds the node to the graph.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`CommandGraph::add`].
    pub fn add(self) -> Result<CommandId, ConfigurationError> {
        self.graph.add_boxed(self.command, self.inputs, self.options)
    }
}

/// An input being described for a [`NodeBuilder`].
///
/// The type tag defaults to [`DEFAULT_INPUT_TYPE`].
#[must_use = "an input is only attached by calling `end`"]
pub struct InputBuilder<'g> {
    node: NodeBuilder<'g>,
    name: String,
    source: Option<(CommandId, String)>,
    input_type: String,
    description: Option<String>,
    required: bool,
    sanitize: SanitizeSpec,
    validate: ValidateSpec,
}

impl<'g> InputBuilder<'g> {
    /// Reads `lookup` from the results of `command`.
    pub fn from(mut self, command: CommandId, lookup: impl Into<String>) -> Self {
        self.source = Some((command, lookup.into()));
        self
    }

    /// Sets the type tag used for sanitation and validation.
    pub fn as_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = input_type.into();
        self
    }

    /// Marks the input as required.
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the sanitation behaviour.
    pub fn sanitize(mut self, sanitize: impl Into<SanitizeSpec>) -> Self {
        self.sanitize = sanitize.into();
        self
    }

    /// Sets the validation behaviour.
    pub fn validate(mut self, validate: impl Into<ValidateSpec>) -> Self {
        self.validate = validate.into();
        self
    }

    /// Sets a human-readable description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attaches the input and returns to the node.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingOption`] when `from` was never
    /// called.
    pub fn end(self) -> Result<NodeBuilder<'g>, ConfigurationError> {
        let Some((command, lookup)) = self.source else {
            return Err(ConfigurationError::missing_option(
                "from",
                "command and lookup",
            ));
        };
        let mut options = InputOptions::new(lookup, self.input_type)
            .named(self.name)
            .required(self.required)
            .sanitize(self.sanitize)
            .validate(self.validate);
        if let Some(description) = self.description {
            options = options.described(description);
        }
        let mut node = self.node;
        node.inputs.push(Input::new(command, options));
        Ok(node)
    }
}
