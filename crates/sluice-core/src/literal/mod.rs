//! Declarative graph description consumed in a single build pass.
//!
//! A [`GraphLiteral`] names catalog commands, their options and the inputs
//! wiring them together. Nodes must be listed after the nodes they read from.
//!
//! ```json
//! {
//!   "root": "sum",
//!   "nodes": [
//!     { "id": "five", "command": "number", "options": { "value": 5 } },
//!     { "id": "ten", "command": "number", "options": { "value": 10 } },
//!     { "id": "sum", "command": "add_number", "inputs": [
//!       { "from": "five", "lookup": "value", "name": "start", "type": "number" },
//!       { "from": "ten", "lookup": "value", "name": "addition", "type": "number" }
//!     ] }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::CommandCatalog;
use crate::dispatcher::DispatcherOptions;
use crate::error::ConfigurationError;
use crate::graph::{CommandGraph, CommandId};
use crate::hooks::Hooks;
use crate::input::Input;
use crate::value::Options;

/// One input of a [`NodeLiteral`].
///
/// Every key besides `from` is read by
/// [`InputOptions::from_options`](crate::InputOptions::from_options).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputLiteral {
    /// Identifier of the upstream node.
    pub from: String,
    /// Input options such as `lookup`, `type`, `name` and `required`.
    #[serde(flatten)]
    pub options: Options,
}

/// One command of a [`GraphLiteral`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLiteral {
    /// Identifier referenced by downstream inputs and by `root`.
    pub id: String,
    /// Catalog key of the command.
    pub command: String,
    /// Options merged over the command's defaults.
    #[serde(default)]
    pub options: Options,
    /// Inputs in resolution order.
    #[serde(default)]
    pub inputs: Vec<InputLiteral>,
}

/// A whole graph described as data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLiteral {
    /// Commands in dependency order.
    pub nodes: Vec<NodeLiteral>,
    /// Identifier of the node a process should run.
    pub root: String,
    /// Options for the dispatcher driving the graph.
    #[serde(default)]
    pub dispatcher: DispatcherOptions,
}

impl GraphLiteral {
    /// Parses a literal from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the [`serde_json::Error`] raised for malformed text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Returns the dispatcher options.
    #[must_use]
    pub const fn dispatcher(&self) -> DispatcherOptions {
        self.dispatcher
    }

    /// Builds the graph with the default [`Hooks`].
    ///
    /// # Errors
    ///
    /// See [`GraphLiteral::build_with_hooks`].
    pub fn build(
        &self,
        catalog: &CommandCatalog,
    ) -> Result<(CommandGraph, CommandId), ConfigurationError> {
        self.build_with_hooks(catalog, Hooks::default())
    }

    /// Builds the graph and returns it with the root handle.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DuplicateNode`] for a repeated node id,
    /// [`ConfigurationError::UnknownNode`] when an input or the root names a
    /// node not defined earlier, [`ConfigurationError::UnknownCatalogKey`]
    /// for an unregistered command and any error raised while parsing input
    /// options.
    pub fn build_with_hooks(
        &self,
        catalog: &CommandCatalog,
        hooks: Hooks,
    ) -> Result<(CommandGraph, CommandId), ConfigurationError> {
        let mut graph = CommandGraph::with_hooks(hooks);
        let mut ids: BTreeMap<&str, CommandId> = BTreeMap::new();
        for node in &self.nodes {
            if ids.contains_key(node.id.as_str()) {
                return Err(ConfigurationError::DuplicateNode {
                    id: node.id.clone(),
                });
            }
            let command = catalog.instantiate(&node.command)?;
            let inputs = node
                .inputs
                .iter()
                .map(|input| {
                    let upstream = lookup_node(&ids, &input.from)?;
                    Input::from_options(upstream, &input.options)
                })
                .collect::<Result<Vec<_>, _>>()?;
            let id = graph.add_boxed(command, inputs, node.options.clone())?;
            debug!(node = node.id.as_str(), %id, command = node.command.as_str(), "built node");
            ids.insert(node.id.as_str(), id);
        }
        let root = lookup_node(&ids, &self.root)?;
        Ok((graph, root))
    }
}

fn lookup_node(ids: &BTreeMap<&str, CommandId>, id: &str) -> Result<CommandId, ConfigurationError> {
    ids.get(id)
        .copied()
        .ok_or_else(|| ConfigurationError::UnknownNode { id: id.to_owned() })
}
