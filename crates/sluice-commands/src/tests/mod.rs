//! Crate-level helpers and end-to-end tests over the built-in commands.

use std::collections::BTreeMap;
use std::sync::Arc;

use rstest::{fixture, rstest};
use sluice_core::{
    Command, CommandCatalog, CommandError, ConfigurationError, Dispatcher, DispatcherOptions,
    ExecutionContext, GraphBuilder, GraphLiteral, Map, Options, Outputs, Process, ProcessError,
    Value,
};

use crate::{
    AddCommand, DISPATCHER_GROUP, MATH_GROUP, NumberCommand, PRIMITIVES_GROUP, SetStatefulCommand,
    StopProcessingCommand, catalog, register_all,
};


/// Executes `command` directly against `dispatcher`, merging `options` over
/// the command's defaults the way a graph would.
pub(crate) async fn execute_with(
    dispatcher: &Dispatcher,
    command: &dyn Command,
    inputs: &Map,
    options: Options,
) -> Result<Outputs, CommandError> {
    let merged = options.merged_over(command.defaults());
    let issues = BTreeMap::new();
    command
        .execute(ExecutionContext::new(dispatcher, inputs, &merged, &issues))
        .await
}

/// Executes `command` against an idle dispatcher.
pub(crate) async fn execute(
    command: &dyn Command,
    inputs: &Map,
    options: Options,
) -> Result<Outputs, CommandError> {
    let dispatcher = Dispatcher::new(DispatcherOptions::new());
    execute_with(&dispatcher, command, inputs, options).await
}

#[fixture]
fn dispatcher() -> Arc<Dispatcher> {
    Arc::new(Dispatcher::new(DispatcherOptions::new()))
}

#[test]
fn register_all_fills_three_groups() {
    let catalog = catalog().expect("catalog builds");
    assert_eq!(catalog.len(), 13);
    assert_eq!(
        catalog.groups().collect::<Vec<_>>(),
        [DISPATCHER_GROUP, MATH_GROUP, PRIMITIVES_GROUP]
    );
    assert_eq!(
        catalog.group(MATH_GROUP),
        Some(vec![
            "add_number",
            "divide_number",
            "increment_by_one",
            "multiply_number",
            "subtract_number",
        ])
    );
}

#[test]
fn register_all_rejects_a_second_registration() {
    let mut catalog = CommandCatalog::new();
    register_all(&mut catalog).expect("first registration");
    let err = register_all(&mut catalog).expect_err("keys are already taken");
    assert!(matches!(
        err,
        ConfigurationError::DuplicateCatalogKey { ref key, .. } if key == "number"
    ));
}

#[rstest]
#[tokio::test]
async fn two_numbers_feed_an_addition(dispatcher: Arc<Dispatcher>) {
    let mut builder = GraphBuilder::new();
    let five = builder
        .node(NumberCommand)
        .option("value", 5)
        .add()
        .expect("five");
    let ten = builder
        .node(NumberCommand)
        .option("value", 10)
        .add()
        .expect("ten");
    let sum = builder
        .node(AddCommand)
        .fetch("start")
        .from(five, "value")
        .as_type("number")
        .end()
        .expect("start input")
        .fetch("addition")
        .from(ten, "value")
        .as_type("number")
        .end()
        .expect("addition input")
        .add()
        .expect("sum");

    let mut process =
        Process::new(dispatcher, builder.build(), sum, Options::new()).expect("process");
    let results = process.run().await.expect("run succeeds");

    assert_eq!(
        results.and_then(|outputs| outputs.get("value").cloned()),
        Some(Value::Number(15.0))
    );
}

#[rstest]
#[tokio::test]
async fn missing_required_output_rejects_the_run(dispatcher: Arc<Dispatcher>) {
    let mut builder = GraphBuilder::new();
    let upstream = builder.node(NumberCommand).add().expect("upstream");
    let root = builder
        .node(AddCommand)
        .fetch("start")
        .from(upstream, "total")
        .as_type("number")
        .required()
        .end()
        .expect("start input")
        .add()
        .expect("root");

    let mut process =
        Process::new(dispatcher, builder.build(), root, Options::new()).expect("process");
    let err = process.run().await.expect_err("run fails");

    assert!(matches!(err, ProcessError::Dependency(ref dependency) if dependency.lookup == "total"));
    assert!(process.results().is_none());
    assert!(!process.is_finished());
}

#[rstest]
#[tokio::test]
async fn non_stateful_dispatcher_is_washed_after_the_run(dispatcher: Arc<Dispatcher>) {
    let mut builder = GraphBuilder::new();
    let root = builder.node(NumberCommand).add().expect("root");

    let mut process = Process::new(Arc::clone(&dispatcher), builder.build(), root, Options::new())
        .expect("process");
    process.run().await.expect("run succeeds");

    assert!(!dispatcher.is_processing());
    assert_eq!(dispatcher.is_stateful(), dispatcher.defaults().stateful());
}

#[rstest]
#[tokio::test]
async fn set_stateful_inside_the_graph_skips_the_reset(dispatcher: Arc<Dispatcher>) {
    let mut builder = GraphBuilder::new();
    let root = builder
        .node(SetStatefulCommand)
        .option("stateful", true)
        .add()
        .expect("root");

    let mut process = Process::new(Arc::clone(&dispatcher), builder.build(), root, Options::new())
        .expect("process");
    let results = process.run().await.expect("run succeeds");

    assert_eq!(
        results.and_then(|outputs| outputs.get("stateful").cloned()),
        Some(Value::Bool(true))
    );
    assert!(!dispatcher.is_processing());
    assert!(dispatcher.is_stateful());
}

#[tokio::test]
async fn stateful_dispatcher_is_only_stopped() {
    let dispatcher = Arc::new(Dispatcher::new(DispatcherOptions::new().with_stateful(true)));
    let mut builder = GraphBuilder::new();
    let root = builder.node(NumberCommand).add().expect("root");

    let mut process = Process::new(Arc::clone(&dispatcher), builder.build(), root, Options::new())
        .expect("process");
    process.run().await.expect("run succeeds");

    assert!(!dispatcher.is_processing());
    assert!(dispatcher.is_stateful());
}

#[rstest]
#[tokio::test]
async fn stopping_inside_the_graph_cancels_the_root(dispatcher: Arc<Dispatcher>) {
    let mut builder = GraphBuilder::new();
    let stop = builder.node(StopProcessingCommand).add().expect("stop");
    let root = builder
        .node(AddCommand)
        .fetch("start")
        .from(stop, "is_processing")
        .as_type("number")
        .end()
        .expect("start input")
        .add()
        .expect("root");

    let mut process = Process::new(Arc::clone(&dispatcher), builder.build(), root, Options::new())
        .expect("process");
    let results = process.run().await.expect("cancellation is not an error");

    assert!(results.is_none());
    assert!(process.graph().is_finished(stop));
    assert!(!process.graph().is_finished(root));
}

#[rstest]
#[tokio::test]
async fn literal_graph_runs_against_the_catalog(dispatcher: Arc<Dispatcher>) {
    let literal = GraphLiteral::from_json(
        r#"{
            "root": "quotient",
            "nodes": [
                { "id": "ten", "command": "number", "options": { "value": 10 } },
                { "id": "quotient", "command": "divide_number", "inputs": [
                    { "from": "ten", "lookup": "value", "name": "start", "type": "number" }
                ] }
            ]
        }"#,
    )
    .expect("literal parses");
    let catalog = catalog().expect("catalog builds");
    let (graph, root) = literal.build(&catalog).expect("graph builds");

    let mut process = Process::new(dispatcher, graph, root, Options::new()).expect("process");
    let results = process.run().await.expect("run succeeds");
    let value = results
        .and_then(|outputs| outputs.get("value").and_then(Value::as_f64))
        .expect("numeric value");

    assert!(value.is_infinite());
}
