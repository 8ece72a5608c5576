//! Crate-level test doubles and behaviour tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::command::{Command, CommandDescription, ExecutionContext};
use crate::error::CommandError;
use crate::graph::{CommandGraph, CommandId};
use crate::hooks::{CommandEvent, LifecycleObserver, ProcessEvent};
use crate::value::{Options, Outputs, Value};


/// Returns a fixed output map and counts its executions.
pub(crate) struct Constant {
    outputs: Outputs,
    executions: Arc<AtomicUsize>,
}

impl Constant {
    pub(crate) fn new(outputs: Outputs) -> Self {
        Self {
            outputs,
            executions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn number(value: f64) -> Self {
        let mut outputs = Outputs::new();
        outputs.insert("value".into(), Value::Number(value));
        Self::new(outputs)
    }

    pub(crate) fn empty() -> Self {
        Self::new(Outputs::new())
    }

    pub(crate) fn executions(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.executions)
    }
}

#[async_trait]
impl Command for Constant {
    fn describe(&self) -> CommandDescription {
        CommandDescription::new("constant", "Constant", "Returns fixed outputs.")
    }

    async fn execute(&self, _context: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        Ok(self.outputs.clone())
    }
}

/// Returns its resolved inputs as outputs, plus the `mode` option.
pub(crate) struct Echo {
    executions: Arc<AtomicUsize>,
}

impl Echo {
    pub(crate) fn new() -> Self {
        Self {
            executions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn executions(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.executions)
    }
}

#[async_trait]
impl Command for Echo {
    fn describe(&self) -> CommandDescription {
        CommandDescription::new("echo", "Echo", "Returns its inputs.")
    }

    fn defaults(&self) -> Options {
        Options::new().with("mode", "echo")
    }

    async fn execute(&self, context: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        let mut outputs = context.inputs().clone();
        if let Some(mode) = context.option("mode") {
            outputs.insert("mode".into(), mode.clone());
        }
        Ok(outputs)
    }
}

/// Clears the dispatcher's processing flag, then reports `value: 1`.
pub(crate) struct Halt;

#[async_trait]
impl Command for Halt {
    async fn execute(&self, context: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
        context.dispatcher().stop_processing();
        let mut outputs = Outputs::new();
        outputs.insert("value".into(), Value::Number(1.0));
        Ok(outputs)
    }
}

/// Marks the dispatcher stateful while it runs.
pub(crate) struct KeepState;

#[async_trait]
impl Command for KeepState {
    async fn execute(&self, context: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
        context.dispatcher().set_stateful(true);
        Ok(Outputs::new())
    }
}

/// Always fails.
pub(crate) struct Broken;

#[async_trait]
impl Command for Broken {
    fn describe(&self) -> CommandDescription {
        CommandDescription::new("broken", "Broken", "Always fails.")
    }

    async fn execute(&self, _context: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
        Err(CommandError::failed("out of order"))
    }
}

/// Records lifecycle notifications as `event:name` strings.
#[derive(Default)]
pub(crate) struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    fn record(&self, event: String) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl LifecycleObserver for RecordingObserver {
    fn command_started(&self, event: &CommandEvent<'_>) {
        self.record(format!("command_started:{}", event.name()));
    }

    fn command_finished(&self, event: &CommandEvent<'_>) {
        let outputs = event.results().map_or(0, Outputs::len);
        self.record(format!("command_finished:{}:{outputs}", event.name()));
    }

    fn process_started(&self, event: &ProcessEvent<'_>) {
        self.record(format!("process_started:{}", event.root()));
    }

    fn process_finished(&self, event: &ProcessEvent<'_>) {
        self.record(format!("process_finished:{}", event.root()));
    }
}

/// Builds a graph holding only `command`.
pub(crate) fn one_node_graph(command: impl Command + 'static) -> (CommandGraph, CommandId) {
    let mut graph = CommandGraph::new();
    let id = graph
        .add(command, Vec::new(), Options::new())
        .expect("add command");
    (graph, id)
}
