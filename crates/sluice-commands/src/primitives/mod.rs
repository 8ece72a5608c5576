//! Commands that produce a single constant `value` output.

use async_trait::async_trait;
use sluice_core::{
    Command, CommandDescription, CommandError, ExecutionContext, Map, Options, Outputs,
    PortDescription, Value,
};

fn value_output(value: Value) -> Outputs {
    let mut outputs = Outputs::new();
    outputs.insert(String::from("value"), value);
    outputs
}

/// Emits the `value` option as a number.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberCommand;

#[async_trait]
impl Command for NumberCommand {
    fn describe(&self) -> CommandDescription {
        CommandDescription::new("number", "Number", "Create a number value.")
            .with_option(
                PortDescription::new("value", "number", "The numeric value.").with_default(0),
            )
            .with_output(PortDescription::new("value", "number", "The numeric value."))
    }

    fn defaults(&self) -> Options {
        Options::new().with("value", 0)
    }

    async fn execute(&self, context: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
        Ok(value_output(Value::Number(context.number("value")?)))
    }
}

/// Emits the `value` option as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCommand;

#[async_trait]
impl Command for StringCommand {
    fn describe(&self) -> CommandDescription {
        CommandDescription::new("string", "String", "Create a text value.")
            .with_option(
                PortDescription::new("value", "string", "The text that you want to create.")
                    .with_default(""),
            )
            .with_output(PortDescription::new("value", "string", "The text value."))
    }

    fn defaults(&self) -> Options {
        Options::new().with("value", "")
    }

    async fn execute(&self, context: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
        let text = match context.input_or_option("value") {
            None | Some(Value::Null) => String::new(),
            Some(value) => value.to_string(),
        };
        Ok(value_output(Value::String(text)))
    }
}

/// Emits the truthiness of the `is_true` option.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanCommand;

#[async_trait]
impl Command for BooleanCommand {
    fn describe(&self) -> CommandDescription {
        CommandDescription::new("boolean", "Boolean", "Create a boolean value.")
            .with_option(
                PortDescription::new("is_true", "boolean", "The value of the boolean.")
                    .with_default(false),
            )
            .with_output(
                PortDescription::new("value", "boolean", "The boolean value that was created.")
                    .with_default(false),
            )
    }

    fn defaults(&self) -> Options {
        Options::new().with("is_true", false)
    }

    async fn execute(&self, context: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
        let flag = context
            .input_or_option("is_true")
            .is_some_and(Value::is_truthy);
        Ok(value_output(Value::Bool(flag)))
    }
}

/// Pairs the `keys` list with the `values` list into an object.
///
/// Non-text keys are rendered with their display form. A later duplicate key
/// overwrites an earlier one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectCommand;

#[async_trait]
impl Command for ObjectCommand {
    fn describe(&self) -> CommandDescription {
        CommandDescription::new(
            "object",
            "Object",
            "Create an object value from key-value pairs.",
        )
        .with_option(
            PortDescription::new(
                "keys",
                "array",
                "The names which relate to the associated values.",
            )
            .with_default(Value::List(Vec::new())),
        )
        .with_option(
            PortDescription::new(
                "values",
                "array",
                "The values which relate to the associated names.",
            )
            .with_default(Value::List(Vec::new())),
        )
        .with_output(
            PortDescription::new(
                "value",
                "object",
                "The object that was created by the key-value pairs.",
            )
            .with_default(Value::Object(Map::new())),
        )
    }

    fn defaults(&self) -> Options {
        Options::new()
            .with("keys", Value::List(Vec::new()))
            .with("values", Value::List(Vec::new()))
    }

    async fn execute(&self, context: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
        let keys = list_operand(context, "keys")?;
        let values = list_operand(context, "values")?;
        if keys.len() != values.len() {
            return Err(CommandError::MismatchedPairs {
                keys: keys.len(),
                values: values.len(),
            });
        }

        let object = keys
            .iter()
            .zip(values)
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect::<Map>();
        Ok(value_output(Value::Object(object)))
    }
}

fn list_operand<'a>(
    context: ExecutionContext<'a>,
    name: &str,
) -> Result<&'a [Value], CommandError> {
    match context.input_or_option(name) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::List(items)) => Ok(items.as_slice()),
        Some(other) => Err(CommandError::failed(format!(
            "option '{name}' must be a list, got {}",
            other.kind()
        ))),
    }
}
