//! Ready-made commands for sluice graphs.
//!
//! The commands fall into three groups:
//!
//! - [`primitives`] produce constant values from their options: numbers,
//!   text, booleans and objects assembled from key/value lists.
//! - [`math`] combine two numeric operands. Each operand is read from the
//!   resolved input of the same name, falling back to the option of that
//!   name. Arithmetic follows IEEE-754, so dividing by zero yields an
//!   infinity rather than an error.
//! - [`control`] manipulate the dispatcher driving the run.
//!
//! [`register_all`] files every command into a [`CommandCatalog`] so graph
//! literals can refer to them by key.
//!
//! # Example
//!
//! ```
//! use sluice_commands::catalog;
//!
//! let catalog = catalog()?;
//! assert!(catalog.contains("add_number"));
//! assert_eq!(catalog.group("Primitives").map(|keys| keys.len()), Some(4));
//! # Ok::<(), sluice_core::ConfigurationError>(())
//! ```

pub mod control;
pub mod math;
pub mod primitives;

#[cfg(test)]
mod tests;

use sluice_core::{Command, CommandCatalog, ConfigurationError};

pub use self::control::{
    ResetCommand, SetStatefulCommand, StartProcessingCommand, StopProcessingCommand,
};
pub use self::math::{AddCommand, DivideCommand, IncrementCommand, MultiplyCommand, SubtractCommand};
pub use self::primitives::{BooleanCommand, NumberCommand, ObjectCommand, StringCommand};

/// Catalog group holding the value-producing commands.
pub const PRIMITIVES_GROUP: &str = "Primitives";
/// Catalog group holding the arithmetic commands.
pub const MATH_GROUP: &str = "Math";
/// Catalog group holding the dispatcher control commands.
pub const DISPATCHER_GROUP: &str = "Dispatcher";

/// Registers every built-in command with `catalog`.
///
/// # Errors
///
/// Returns [`ConfigurationError::DuplicateCatalogKey`] when the catalog
/// already holds a command under one of the built-in keys.
pub fn register_all(catalog: &mut CommandCatalog) -> Result<(), ConfigurationError> {
    catalog
        .add_command(boxed::<NumberCommand>, PRIMITIVES_GROUP)?
        .add_command(boxed::<StringCommand>, PRIMITIVES_GROUP)?
        .add_command(boxed::<BooleanCommand>, PRIMITIVES_GROUP)?
        .add_command(boxed::<ObjectCommand>, PRIMITIVES_GROUP)?
        .add_command(boxed::<AddCommand>, MATH_GROUP)?
        .add_command(boxed::<SubtractCommand>, MATH_GROUP)?
        .add_command(boxed::<MultiplyCommand>, MATH_GROUP)?
        .add_command(boxed::<DivideCommand>, MATH_GROUP)?
        .add_command(boxed::<IncrementCommand>, MATH_GROUP)?
        .add_command(boxed::<StartProcessingCommand>, DISPATCHER_GROUP)?
        .add_command(boxed::<StopProcessingCommand>, DISPATCHER_GROUP)?
        .add_command(boxed::<ResetCommand>, DISPATCHER_GROUP)?
        .add_command(boxed::<SetStatefulCommand>, DISPATCHER_GROUP)?;
    Ok(())
}

/// Returns a catalog populated with every built-in command.
///
/// # Errors
///
/// Propagates the error from [`register_all`]; a fresh catalog never
/// produces one in practice.
pub fn catalog() -> Result<CommandCatalog, ConfigurationError> {
    let mut catalog = CommandCatalog::new();
    register_all(&mut catalog)?;
    Ok(catalog)
}

fn boxed<C: Command + Default + 'static>() -> Box<dyn Command> {
    Box::new(C::default())
}
