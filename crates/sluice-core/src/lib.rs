//! Command-graph execution for sluice.
//!
//! A [`Command`] turns resolved inputs and options into a map of named
//! outputs. An [`Input`] pulls one of those outputs from an upstream command,
//! optionally cleaning it with a [`Sanitation`] collaborator and checking it
//! with a [`Validation`] collaborator before the owning command sees it.
//! Commands live in a [`CommandGraph`] arena and refer to each other through
//! [`CommandId`] handles.
//!
//! # Architecture
//!
//! [`CommandGraph::process`] resolves a command by first processing every
//! upstream command its inputs read from, in declaration order, then running
//! its own `execute`. Results are cached per node, so a command shared by
//! several inputs executes once per run. A [`Dispatcher`] shared as
//! `Arc<Dispatcher>` carries the `processing` flag; clearing it is the
//! cooperative cancellation signal. A [`Process`] starts the dispatcher,
//! drives the root command and washes the dispatcher afterwards.
//!
//! Graphs can be assembled directly, with the fluent [`GraphBuilder`], or
//! from a declarative [`GraphLiteral`] resolved against a [`CommandCatalog`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use sluice_core::{
//!     Command, CommandError, Dispatcher, DispatcherOptions, ExecutionContext, GraphBuilder,
//!     Options, Outputs, Process, Value,
//! };
//!
//! struct Double;
//!
//! #[async_trait]
//! impl Command for Double {
//!     async fn execute(&self, context: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
//!         let value = context
//!             .input_or_option("value")
//!             .and_then(Value::as_f64)
//!             .unwrap_or_default();
//!         let mut outputs = Outputs::new();
//!         outputs.insert("value".into(), Value::Number(value * 2.0));
//!         Ok(outputs)
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().expect("runtime").block_on(async {
//! let mut builder = GraphBuilder::new();
//! let seed = builder.node(Double).option("value", 3).add()?;
//! let root = builder
//!     .node(Double)
//!     .fetch("value")
//!     .from(seed, "value")
//!     .as_type("number")
//!     .required()
//!     .end()?
//!     .add()?;
//!
//! let dispatcher = Arc::new(Dispatcher::new(DispatcherOptions::new()));
//! let mut process = Process::new(dispatcher, builder.build(), root, Options::new())?;
//! let results = process.run().await?;
//! assert_eq!(results.and_then(|r| r.get("value").cloned()), Some(Value::Number(12.0)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # }).expect("doctest");
//! ```

pub mod builder;
pub mod catalog;
pub mod checks;
pub mod command;
pub mod dispatcher;
pub mod error;
pub mod graph;
pub mod hooks;
pub mod input;
pub mod literal;
pub mod process;
pub mod value;

#[cfg(test)]
mod tests;

pub use self::builder::{GraphBuilder, InputBuilder, NodeBuilder};
pub use self::catalog::{CommandCatalog, CommandFactory, DEFAULT_GROUP};
pub use self::checks::{
    Sanitation, SanitationRequest, TypeSanitizers, TypeValidators, Validation, ValidationIssue,
    ValidationRequest,
};
pub use self::command::{Command, CommandDescription, ExecutionContext, PortDescription};
pub use self::dispatcher::{Dispatcher, DispatcherOptions};
pub use self::error::{CommandError, ConfigurationError, DependencyError, ProcessError};
pub use self::graph::{CommandGraph, CommandId};
pub use self::hooks::{CommandEvent, Hooks, LifecycleObserver, ProcessEvent};
pub use self::input::{DEFAULT_INPUT_TYPE, Input, InputOptions, SanitizeSpec, ValidateSpec};
pub use self::literal::{GraphLiteral, InputLiteral, NodeLiteral};
pub use self::process::Process;
pub use self::value::{Map, Options, Outputs, Value};
