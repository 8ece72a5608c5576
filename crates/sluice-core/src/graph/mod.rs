//! Arena of commands and the memoised resolution algorithm.
//!
//! Every command lives in a [`CommandGraph`] and is addressed by a copyable
//! [`CommandId`]. Inputs refer to their upstream command by id, and may only
//! refer to commands that were added earlier, so a graph can never contain a
//! cycle. Shared upstream commands are memoised per node: within one run each
//! node executes at most once no matter how many inputs read from it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::checks::ValidationIssue;
use crate::command::{Command, CommandDescription, ExecutionContext};
use crate::dispatcher::Dispatcher;
use crate::error::{ConfigurationError, DependencyError, ProcessError};
use crate::hooks::{CommandEvent, Hooks};
use crate::input::Input;
use crate::value::{Map, Options, Outputs, Value};

/// Handle to a command inside a [`CommandGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandId(usize);

impl CommandId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the position of the command in insertion order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct CommandNode {
    command: Box<dyn Command>,
    description: CommandDescription,
    inputs: Vec<Input>,
    options: Options,
    resolved: Map,
    issues: BTreeMap<String, Vec<ValidationIssue>>,
    results: Option<Outputs>,
    finished: bool,
}

impl CommandNode {
    fn clear_run_state(&mut self) {
        self.resolved.clear();
        self.issues.clear();
        self.results = None;
        self.finished = false;
        for input in &mut self.inputs {
            input.clear_value();
        }
    }

    fn label(&self) -> String {
        self.description.display_name().to_owned()
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("command", &self.description.display_name())
            .field("inputs", &self.inputs)
            .field("options", &self.options)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

/// Owns the commands of one computation graph and resolves them.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use sluice_core::{
///     Command, CommandError, CommandGraph, Dispatcher, DispatcherOptions, ExecutionContext,
///     Input, InputOptions, Options, Outputs, Value,
/// };
///
/// struct Number;
///
/// #[async_trait]
/// impl Command for Number {
///     async fn execute(&self, context: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
///         let mut outputs = Outputs::new();
///         let value = context.input_or_option("value").cloned().unwrap_or_default();
///         outputs.insert("value".into(), value);
///         Ok(outputs)
///     }
/// }
///
/// # tokio::runtime::Builder::new_current_thread().build().expect("runtime").block_on(async {
/// let mut graph = CommandGraph::new();
/// let five = graph.add(Number, vec![], Options::new().with("value", 5))?;
/// let echo = graph.add(
///     Number,
///     vec![Input::new(five, InputOptions::new("value", "number"))],
///     Options::new(),
/// )?;
///
/// let dispatcher = Dispatcher::new(DispatcherOptions::new());
/// dispatcher.start_processing();
/// let results = graph.process(echo, &dispatcher).await?;
/// assert_eq!(results.and_then(|r| r.get("value").cloned()), Some(Value::Number(5.0)));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # }).expect("doctest");
/// ```
#[derive(Default)]
pub struct CommandGraph {
    nodes: Vec<CommandNode>,
    hooks: Hooks,
}

impl CommandGraph {
    /// Creates an empty graph using the default [`Hooks`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph using the given collaborators.
    #[must_use]
    pub fn with_hooks(hooks: Hooks) -> Self {
        Self {
            nodes: Vec::new(),
            hooks,
        }
    }

    /// Returns the collaborators consulted while resolving.
    #[must_use]
    pub const fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Replaces the collaborators.
    pub fn set_hooks(&mut self, hooks: Hooks) -> &mut Self {
        self.hooks = hooks;
        self
    }

    /// Adds a command with its inputs and options.
    ///
    /// The node's options are `options` merged over `command.defaults()`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownCommand`] when an input refers to
    /// a command that is not in this graph, and
    /// [`ConfigurationError::DuplicateInput`] when two inputs share a name.
    pub fn add<C>(
        &mut self,
        command: C,
        inputs: Vec<Input>,
        options: Options,
    ) -> Result<CommandId, ConfigurationError>
    where
        C: Command + 'static,
    {
        self.add_boxed(Box::new(command), inputs, options)
    }

    /// Adds an already boxed command, as produced by a catalog factory.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`CommandGraph::add`].
    pub fn add_boxed(
        &mut self,
        command: Box<dyn Command>,
        inputs: Vec<Input>,
        options: Options,
    ) -> Result<CommandId, ConfigurationError> {
        let description = command.describe();
        let mut names = BTreeSet::new();
        for input in &inputs {
            let upstream = input.command();
            if !self.contains(upstream) {
                return Err(ConfigurationError::UnknownCommand {
                    index: upstream.index(),
                });
            }
            if !names.insert(input.name()) {
                return Err(ConfigurationError::DuplicateInput {
                    command: description.display_name().to_owned(),
                    name: input.name().to_owned(),
                });
            }
        }
        let merged = options.merged_over(command.defaults());
        let id = CommandId::new(self.nodes.len());
        debug!(%id, command = description.display_name(), inputs = inputs.len(), "added command");
        self.nodes.push(CommandNode {
            command,
            description,
            inputs,
            options: merged,
            resolved: Map::new(),
            issues: BTreeMap::new(),
            results: None,
            finished: false,
        });
        Ok(id)
    }

    /// Returns the number of commands.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` when the graph holds no commands.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` when the handle belongs to this graph.
    #[must_use]
    pub const fn contains(&self, id: CommandId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Returns every handle in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = CommandId> + use<> {
        (0..self.nodes.len()).map(CommandId::new)
    }

    /// Returns the self-description of a command.
    #[must_use]
    pub fn describe(&self, id: CommandId) -> Option<&CommandDescription> {
        self.nodes.get(id.index()).map(|node| &node.description)
    }

    /// Returns `true` once the command has executed in the current run.
    #[must_use]
    pub fn is_finished(&self, id: CommandId) -> bool {
        self.nodes.get(id.index()).is_some_and(|node| node.finished)
    }

    /// Returns an owned copy of the command's results, or `None` before it
    /// has finished.
    #[must_use]
    pub fn results(&self, id: CommandId) -> Option<Outputs> {
        self.nodes
            .get(id.index())
            .and_then(|node| node.results.clone())
    }

    /// Returns one named output, or `default` when the command has no results
    /// or lacks that output.
    #[must_use]
    pub fn result(&self, id: CommandId, name: &str, default: impl Into<Value>) -> Value {
        self.nodes
            .get(id.index())
            .and_then(|node| node.results.as_ref())
            .and_then(|results| results.get(name))
            .cloned()
            .unwrap_or_else(|| default.into())
    }

    /// Returns the values resolved for the command's inputs, keyed by
    /// binding name.
    #[must_use]
    pub fn resolved_inputs(&self, id: CommandId) -> Option<&Map> {
        self.nodes.get(id.index()).map(|node| &node.resolved)
    }

    /// Returns the validation issues collected while resolving the command's
    /// inputs, keyed by binding name.
    #[must_use]
    pub fn validation_issues(&self, id: CommandId) -> Option<&BTreeMap<String, Vec<ValidationIssue>>> {
        self.nodes.get(id.index()).map(|node| &node.issues)
    }

    /// Returns the command's declared inputs.
    #[must_use]
    pub fn inputs(&self, id: CommandId) -> Option<&[Input]> {
        self.nodes.get(id.index()).map(|node| node.inputs.as_slice())
    }

    /// Returns one declared input by binding name.
    #[must_use]
    pub fn input(&self, id: CommandId, name: &str) -> Option<&Input> {
        self.inputs(id)
            .and_then(|inputs| inputs.iter().find(|input| input.name() == name))
    }

    /// Returns the command's merged options.
    #[must_use]
    pub fn options(&self, id: CommandId) -> Option<&Options> {
        self.nodes.get(id.index()).map(|node| &node.options)
    }

    /// Forgets every cached result so the graph can run again from scratch.
    pub fn reset_run_state(&mut self) -> &mut Self {
        for node in &mut self.nodes {
            node.clear_run_state();
        }
        self
    }

    /// Resolves the command's inputs, executes it and caches the results.
    ///
    /// Returns the cached results without doing any work when the dispatcher
    /// is not processing or the command has already finished. Inputs are
    /// resolved in declaration order, each upstream command being processed
    /// first. The processing flag is checked again before every input and
    /// before execution; once it is cleared the call returns whatever is
    /// cached, usually `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Dependency`] when a required input's upstream
    /// results lack its lookup key, [`ProcessError::Execute`] when a command
    /// fails and [`ProcessError::Configuration`] for a handle that is not part
    /// of this graph. A failed command is left unfinished.
    pub fn process<'a>(
        &'a mut self,
        id: CommandId,
        dispatcher: &'a Dispatcher,
    ) -> BoxFuture<'a, Result<Option<Outputs>, ProcessError>> {
        Box::pin(async move {
            let node = self.node(id)?;
            if node.finished {
                return Ok(node.results.clone());
            }
            if !dispatcher.is_processing() {
                debug!(%id, command = node.description.display_name(), "dispatcher stopped, skipping");
                return Ok(node.results.clone());
            }

            self.begin(id)?;
            let count = self.node(id)?.inputs.len();
            for position in 0..count {
                if !dispatcher.is_processing() {
                    return self.cancelled(id);
                }
                self.resolve_input(id, position, dispatcher).await?;
            }
            if !dispatcher.is_processing() {
                return self.cancelled(id);
            }

            let outputs = {
                let ready = self.node(id)?;
                let context = ExecutionContext::new(
                    dispatcher,
                    &ready.resolved,
                    &ready.options,
                    &ready.issues,
                );
                ready
                    .command
                    .execute(context)
                    .await
                    .map_err(|source| ProcessError::Execute {
                        command: ready.label(),
                        source,
                    })?
            };
            self.finish(id, outputs)
        })
    }

    async fn resolve_input(
        &mut self,
        id: CommandId,
        position: usize,
        dispatcher: &Dispatcher,
    ) -> Result<(), ProcessError> {
        let upstream = self.input_at(id, position)?.command();
        let upstream_results = self.process(upstream, dispatcher).await?;
        if upstream_results.is_none() && !dispatcher.is_processing() {
            return Ok(());
        }
        let upstream_label = self.node(upstream)?.label();

        let Self { nodes, hooks } = self;
        let node = nodes
            .get_mut(id.index())
            .ok_or(ConfigurationError::UnknownCommand { index: id.index() })?;
        let input = node
            .inputs
            .get_mut(position)
            .ok_or(ConfigurationError::UnknownCommand { index: id.index() })?;
        let found = upstream_results
            .as_ref()
            .and_then(|results| results.get(input.lookup()))
            .filter(|value| !value.is_null())
            .cloned();

        let Some(value) = found else {
            if input.is_required() {
                return Err(DependencyError {
                    command: upstream_label,
                    lookup: input.lookup().to_owned(),
                    input: input.name().to_owned(),
                }
                .into());
            }
            debug!(
                %id,
                input = input.name(),
                lookup = input.lookup(),
                upstream = %upstream_label,
                "optional input missing, skipping"
            );
            return Ok(());
        };

        input.set_value(value);
        if input.should_sanitize() {
            input.sanitize(hooks.sanitation());
        }
        if input.should_validate() {
            let issues = input.validate(hooks.validation());
            if !issues.is_empty() {
                for issue in &issues {
                    warn!(%id, input = input.name(), %issue, "input failed validation");
                }
                node.issues.insert(input.name().to_owned(), issues);
            }
        }
        if let Some(resolved) = input.value() {
            debug!(%id, input = input.name(), value = %resolved, "resolved input");
            node.resolved
                .insert(input.name().to_owned(), resolved.clone());
        }
        Ok(())
    }

    fn node(&self, id: CommandId) -> Result<&CommandNode, ConfigurationError> {
        self.nodes
            .get(id.index())
            .ok_or(ConfigurationError::UnknownCommand { index: id.index() })
    }

    fn input_at(&self, id: CommandId, position: usize) -> Result<&Input, ConfigurationError> {
        self.node(id)?
            .inputs
            .get(position)
            .ok_or(ConfigurationError::UnknownCommand { index: id.index() })
    }

    fn begin(&mut self, id: CommandId) -> Result<(), ConfigurationError> {
        let Self { nodes, hooks } = self;
        let node = nodes
            .get_mut(id.index())
            .ok_or(ConfigurationError::UnknownCommand { index: id.index() })?;
        node.clear_run_state();
        debug!(%id, command = node.description.display_name(), "processing command");
        hooks.notify(|observer| {
            observer.command_started(&CommandEvent::new(id, &node.description, None));
        });
        Ok(())
    }

    fn cancelled(&self, id: CommandId) -> Result<Option<Outputs>, ProcessError> {
        let node = self.node(id)?;
        debug!(%id, command = node.description.display_name(), "dispatcher stopped mid-resolution");
        Ok(node.results.clone())
    }

    fn finish(&mut self, id: CommandId, outputs: Outputs) -> Result<Option<Outputs>, ProcessError> {
        let Self { nodes, hooks } = self;
        let node = nodes
            .get_mut(id.index())
            .ok_or(ConfigurationError::UnknownCommand { index: id.index() })?;
        node.finished = true;
        node.results = Some(outputs.clone());
        debug!(%id, command = node.description.display_name(), outputs = outputs.len(), "command finished");
        hooks.notify(|observer| {
            observer.command_finished(&CommandEvent::new(
                id,
                &node.description,
                node.results.as_ref(),
            ));
        });
        Ok(Some(outputs))
    }
}

impl fmt::Debug for CommandGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandGraph")
            .field("nodes", &self.nodes)
            .field("hooks", &self.hooks)
            .finish()
    }
}
