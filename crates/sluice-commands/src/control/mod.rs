//! Commands that act on the dispatcher driving the run.
//!
//! Stopping the dispatcher from inside a graph cancels every command that
//! has not started executing yet; the process then returns no results.

use async_trait::async_trait;
use sluice_core::{
    Command, CommandDescription, CommandError, Dispatcher, ExecutionContext, Options, Outputs,
    PortDescription, Value,
};
use tracing::info;

fn dispatcher_state(dispatcher: &Dispatcher) -> Outputs {
    let mut outputs = Outputs::new();
    outputs.insert(
        String::from("is_processing"),
        Value::Bool(dispatcher.is_processing()),
    );
    outputs.insert(
        String::from("stateful"),
        Value::Bool(dispatcher.is_stateful()),
    );
    outputs
}

fn state_ports(description: CommandDescription) -> CommandDescription {
    description
        .with_output(PortDescription::new(
            "is_processing",
            "boolean",
            "Whether the dispatcher is processing afterwards.",
        ))
        .with_output(PortDescription::new(
            "stateful",
            "boolean",
            "Whether the dispatcher is stateful afterwards.",
        ))
}

/// Marks the dispatcher as processing.
#[derive(Debug, Clone, Copy, Default)]
pub struct StartProcessingCommand;

#[async_trait]
impl Command for StartProcessingCommand {
    fn describe(&self) -> CommandDescription {
        state_ports(CommandDescription::new(
            "start_processing",
            "Start Processing",
            "Mark the dispatcher as processing.",
        ))
    }

    async fn execute(&self, context: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
        let dispatcher = context.dispatcher();
        dispatcher.start_processing();
        Ok(dispatcher_state(dispatcher))
    }
}

/// Clears the processing flag, cancelling the rest of the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct StopProcessingCommand;

#[async_trait]
impl Command for StopProcessingCommand {
    fn describe(&self) -> CommandDescription {
        state_ports(CommandDescription::new(
            "stop_processing",
            "Stop Processing",
            "Stop the dispatcher, cancelling the remaining commands.",
        ))
    }

    async fn execute(&self, context: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
        let dispatcher = context.dispatcher();
        info!("stop requested by command");
        dispatcher.stop_processing();
        Ok(dispatcher_state(dispatcher))
    }
}

/// Restores the dispatcher to its post-construction state.
///
/// A reset clears the processing flag, so it also cancels the rest of the
/// run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResetCommand;

#[async_trait]
impl Command for ResetCommand {
    fn describe(&self) -> CommandDescription {
        state_ports(CommandDescription::new(
            "reset_dispatcher",
            "Reset Dispatcher",
            "Restore the dispatcher to its initial state.",
        ))
    }

    async fn execute(&self, context: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
        let dispatcher = context.dispatcher();
        dispatcher.reset();
        Ok(dispatcher_state(dispatcher))
    }
}

/// Sets whether the dispatcher keeps its state after the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetStatefulCommand;

#[async_trait]
impl Command for SetStatefulCommand {
    fn describe(&self) -> CommandDescription {
        CommandDescription::new(
            "set_stateful",
            "Set Stateful",
            "Choose whether the dispatcher is reset after the run.",
        )
        .with_input(PortDescription::new(
            "stateful",
            "boolean",
            "Whether the dispatcher should keep its state.",
        ))
        .with_option(
            PortDescription::new("stateful", "boolean", "Fallback for the stateful input.")
                .with_default(false),
        )
        .with_output(PortDescription::new(
            "stateful",
            "boolean",
            "The statefulness that was applied.",
        ))
    }

    fn defaults(&self) -> Options {
        Options::new().with("stateful", false)
    }

    async fn execute(&self, context: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
        let stateful = context
            .input_or_option("stateful")
            .is_some_and(Value::is_truthy);
        context.dispatcher().set_stateful(stateful);

        let mut outputs = Outputs::new();
        outputs.insert(String::from("stateful"), Value::Bool(stateful));
        Ok(outputs)
    }
}
