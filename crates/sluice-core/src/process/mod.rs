//! Drives one run of a command graph against a dispatcher.

use std::sync::Arc;

use tracing::{info, warn};

use crate::command::CommandDescription;
use crate::dispatcher::Dispatcher;
use crate::error::{ConfigurationError, ProcessError};
use crate::graph::{CommandGraph, CommandId};
use crate::hooks::ProcessEvent;
use crate::value::{Options, Outputs};

/// Binds a shared dispatcher to the root command of a graph.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use async_trait::async_trait;
/// use sluice_core::{
///     Command, CommandError, CommandGraph, Dispatcher, DispatcherOptions, ExecutionContext,
///     Options, Outputs, Process, Value,
/// };
///
/// struct Answer;
///
/// #[async_trait]
/// impl Command for Answer {
///     async fn execute(&self, _: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
///         let mut outputs = Outputs::new();
///         outputs.insert("value".into(), Value::Number(42.0));
///         Ok(outputs)
///     }
/// }
///
/// # tokio::runtime::Builder::new_current_thread().build().expect("runtime").block_on(async {
/// let mut graph = CommandGraph::new();
/// let root = graph.add(Answer, vec![], Options::new())?;
/// let dispatcher = Arc::new(Dispatcher::new(DispatcherOptions::new()));
///
/// let mut process = Process::new(Arc::clone(&dispatcher), graph, root, Options::new())?;
/// let results = process.run().await?;
///
/// assert_eq!(results.and_then(|r| r.get("value").cloned()), Some(Value::Number(42.0)));
/// assert!(!dispatcher.is_processing());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # }).expect("doctest");
/// ```
#[derive(Debug)]
pub struct Process {
    dispatcher: Arc<Dispatcher>,
    graph: CommandGraph,
    command: CommandId,
    options: Options,
    results: Option<Outputs>,
    finished: bool,
}

impl Process {
    /// Self-description shared with command tooling.
    #[must_use]
    pub fn describe() -> CommandDescription {
        CommandDescription::new(
            "process",
            "Process",
            "Runs a command graph from its root against a shared dispatcher.",
        )
    }

    /// Options a process starts from. Currently empty.
    #[must_use]
    pub const fn defaults() -> Options {
        Options::new()
    }

    /// Creates a process for the `root` command of `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownCommand`] when `root` is not part
    /// of `graph`.
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        graph: CommandGraph,
        root: CommandId,
        options: Options,
    ) -> Result<Self, ConfigurationError> {
        if !graph.contains(root) {
            return Err(ConfigurationError::UnknownCommand {
                index: root.index(),
            });
        }
        Ok(Self {
            dispatcher,
            graph,
            command: root,
            options: options.merged_over(Self::defaults()),
            results: None,
            finished: false,
        })
    }

    /// Runs the graph from its root.
    ///
    /// Starts the dispatcher, processes the root, then resets the dispatcher
    /// unless it is stateful and stops it. The dispatcher is shut down the
    /// same way when the run fails. Returns `None` when the run was cancelled
    /// before the root finished.
    ///
    /// # Errors
    ///
    /// Propagates the [`ProcessError`] raised while processing the graph;
    /// the process keeps its previous results.
    pub async fn run(&mut self) -> Result<Option<Outputs>, ProcessError> {
        let root = self.command;
        self.dispatcher.start_processing();
        info!(%root, "process started");
        self.graph.hooks().notify(|observer| {
            observer.process_started(&ProcessEvent::new(root, None));
        });

        let outcome = self.graph.process(root, &self.dispatcher).await;
        self.shut_down();

        let results = match outcome {
            Ok(results) => results,
            Err(err) => {
                warn!(%root, error = %err, "process failed");
                return Err(err);
            }
        };
        if results.is_none() {
            info!(%root, "process cancelled before the root finished");
        } else {
            info!(%root, "process finished");
        }
        self.results.clone_from(&results);
        self.finished = true;
        let recorded = self.results.as_ref();
        self.graph.hooks().notify(|observer| {
            observer.process_finished(&ProcessEvent::new(root, recorded));
        });
        Ok(results)
    }

    fn shut_down(&self) {
        if !self.dispatcher.is_stateful() {
            self.dispatcher.reset();
        }
        self.dispatcher.stop_processing();
    }

    /// Returns the results of the last completed run.
    #[must_use]
    pub const fn results(&self) -> Option<&Outputs> {
        self.results.as_ref()
    }

    /// Returns the shared dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Returns the root command.
    #[must_use]
    pub const fn command(&self) -> CommandId {
        self.command
    }

    /// Returns the graph being run.
    #[must_use]
    pub const fn graph(&self) -> &CommandGraph {
        &self.graph
    }

    /// Returns the graph mutably, e.g. to reset its run state.
    pub const fn graph_mut(&mut self) -> &mut CommandGraph {
        &mut self.graph
    }

    /// Returns the process options.
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Returns `true` once a run has completed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consumes the process, returning its graph.
    #[must_use]
    pub fn into_graph(self) -> CommandGraph {
        self.graph
    }
}
