//! Registry of constructible commands grouped for tooling.
//!
//! A [`CommandCatalog`] maps each command's `describe().key` to a factory so
//! graphs can be assembled from plain data, as the graph literal does.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::command::{Command, CommandDescription};
use crate::error::ConfigurationError;

/// Group used when none is given.
pub const DEFAULT_GROUP: &str = "Default";

/// Builds a fresh command instance.
pub type CommandFactory = fn() -> Box<dyn Command>;

#[derive(Clone)]
struct CatalogEntry {
    factory: CommandFactory,
    description: CommandDescription,
}

/// Commands available by key, organised into named groups.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use sluice_core::{Command, CommandCatalog, CommandDescription, CommandError, ExecutionContext, Outputs};
///
/// struct Noop;
///
/// #[async_trait]
/// impl Command for Noop {
///     fn describe(&self) -> CommandDescription {
///         CommandDescription::new("noop", "No-op", "Does nothing.")
///     }
///
///     async fn execute(&self, _: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
///         Ok(Outputs::new())
///     }
/// }
///
/// let mut catalog = CommandCatalog::new();
/// catalog.add_command(|| Box::new(Noop), "Utilities")?;
/// assert!(catalog.has_group("Utilities"));
/// assert!(catalog.instantiate("noop").is_ok());
/// # Ok::<(), sluice_core::ConfigurationError>(())
/// ```
#[derive(Clone, Default)]
pub struct CommandCatalog {
    groups: BTreeMap<String, BTreeMap<String, CatalogEntry>>,
}

impl CommandCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty group; existing groups are left untouched.
    pub fn add_group(&mut self, group: impl Into<String>) -> &mut Self {
        self.groups.entry(group.into()).or_default();
        self
    }

    /// Registers a command factory under its description key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidOption`] when the command does
    /// not describe a key, and [`ConfigurationError::DuplicateCatalogKey`]
    /// when the key is already registered in any group.
    pub fn add_command(
        &mut self,
        factory: CommandFactory,
        group: &str,
    ) -> Result<&mut Self, ConfigurationError> {
        let description = factory().describe();
        let Some(key) = description.key().map(str::to_owned) else {
            return Err(ConfigurationError::invalid_option(
                "key",
                "command description key",
                "nothing",
            ));
        };
        if let Some(existing) = self.group_of(&key) {
            return Err(ConfigurationError::DuplicateCatalogKey {
                key,
                group: existing.to_owned(),
            });
        }
        debug!(key = key.as_str(), group, "registered command");
        self.groups
            .entry(group.to_owned())
            .or_default()
            .insert(key, CatalogEntry {
                factory,
                description,
            });
        Ok(self)
    }

    /// Returns `true` when the group exists.
    #[must_use]
    pub fn has_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    /// Returns the keys registered in a group, in order.
    #[must_use]
    pub fn group(&self, group: &str) -> Option<Vec<&str>> {
        self.groups
            .get(group)
            .map(|entries| entries.keys().map(String::as_str).collect())
    }

    /// Returns the group names, in order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Returns the description registered under a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CommandDescription> {
        self.entry(key).map(|entry| &entry.description)
    }

    /// Returns `true` when a command is registered under the key.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    /// Builds a fresh command for the key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownCatalogKey`] when nothing is
    /// registered under the key.
    pub fn instantiate(&self, key: &str) -> Result<Box<dyn Command>, ConfigurationError> {
        self.entry(key)
            .map(|entry| (entry.factory)())
            .ok_or_else(|| ConfigurationError::UnknownCatalogKey {
                key: key.to_owned(),
            })
    }

    /// Returns every description paired with its group, ordered by group
    /// then key.
    pub fn descriptions(&self) -> impl Iterator<Item = (&str, &CommandDescription)> {
        self.groups.iter().flat_map(|(group, entries)| {
            entries
                .values()
                .map(move |entry| (group.as_str(), &entry.description))
        })
    }

    /// Returns the number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }

    /// Returns `true` when no commands are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.values().all(BTreeMap::is_empty)
    }

    fn entry(&self, key: &str) -> Option<&CatalogEntry> {
        self.groups.values().find_map(|entries| entries.get(key))
    }

    fn group_of(&self, key: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, entries)| entries.contains_key(key))
            .map(|(group, _)| group.as_str())
    }
}

impl fmt::Debug for CommandCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups: BTreeMap<&str, Vec<&str>> = self
            .groups
            .iter()
            .map(|(group, entries)| {
                (
                    group.as_str(),
                    entries.keys().map(String::as_str).collect(),
                )
            })
            .collect();
        f.debug_struct("CommandCatalog")
            .field("groups", &groups)
            .finish()
    }
}
