//! Arithmetic on two numeric operands.
//!
//! Every command reads `start` plus one second operand and emits the result
//! as `value`. Operands come from the resolved input of the same name when
//! one is bound, otherwise from the option.

use async_trait::async_trait;
use sluice_core::{
    Command, CommandDescription, CommandError, ExecutionContext, Options, Outputs,
    PortDescription, Value,
};
use tracing::debug;

/// Shape shared by the binary arithmetic commands.
struct Operation {
    key: &'static str,
    name: &'static str,
    description: &'static str,
    operand: &'static str,
    operand_description: &'static str,
    operand_default: i32,
    apply: fn(f64, f64) -> f64,
}

impl Operation {
    fn describe(&self) -> CommandDescription {
        CommandDescription::new(self.key, self.name, self.description)
            .with_input(PortDescription::new(
                "start",
                "number",
                "The number that we start at.",
            ))
            .with_input(PortDescription::new(
                self.operand,
                "number",
                self.operand_description,
            ))
            .with_option(
                PortDescription::new("start", "number", "Fallback for the start input.")
                    .with_default(0),
            )
            .with_option(
                PortDescription::new(self.operand, "number", self.operand_description)
                    .with_default(self.operand_default),
            )
            .with_output(PortDescription::new("value", "number", "The final value."))
    }

    fn defaults(&self) -> Options {
        Options::new()
            .with("start", 0)
            .with(self.operand, self.operand_default)
    }

    fn execute(&self, context: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
        let start = context.number("start")?;
        let operand = context.number(self.operand)?;
        let value = (self.apply)(start, operand);
        debug!(command = self.key, start, operand, value, "computed");

        let mut outputs = Outputs::new();
        outputs.insert(String::from("value"), Value::Number(value));
        Ok(outputs)
    }
}

macro_rules! arithmetic_command {
    ($(#[$meta:meta])* $command:ident, $operation:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $command;

        #[async_trait]
        impl Command for $command {
            fn describe(&self) -> CommandDescription {
                $operation.describe()
            }

            fn defaults(&self) -> Options {
                $operation.defaults()
            }

            async fn execute(
                &self,
                context: ExecutionContext<'_>,
            ) -> Result<Outputs, CommandError> {
                $operation.execute(context)
            }
        }
    };
}

#[expect(
    clippy::float_arithmetic,
    reason = "numeric commands follow IEEE-754 arithmetic"
)]
const fn add(start: f64, addition: f64) -> f64 {
    start + addition
}

#[expect(
    clippy::float_arithmetic,
    reason = "numeric commands follow IEEE-754 arithmetic"
)]
const fn subtract(start: f64, subtraction: f64) -> f64 {
    start - subtraction
}

#[expect(
    clippy::float_arithmetic,
    reason = "numeric commands follow IEEE-754 arithmetic"
)]
const fn multiply(start: f64, multiplier: f64) -> f64 {
    start * multiplier
}

#[expect(
    clippy::float_arithmetic,
    reason = "division by zero yields an infinity or NaN, never an error"
)]
const fn divide(start: f64, divisor: f64) -> f64 {
    start / divisor
}

const ADD: Operation = Operation {
    key: "add_number",
    name: "Add Number",
    description: "Add a number.",
    operand: "addition",
    operand_description: "The number that we add to our starting number.",
    operand_default: 0,
    apply: add,
};

const SUBTRACT: Operation = Operation {
    key: "subtract_number",
    name: "Subtract Number",
    description: "Subtract a number.",
    operand: "subtraction",
    operand_description: "The number that we subtract from our starting number.",
    operand_default: 0,
    apply: subtract,
};

const MULTIPLY: Operation = Operation {
    key: "multiply_number",
    name: "Multiply Number",
    description: "Multiply a number.",
    operand: "multiplier",
    operand_description: "The number that we multiply our starting number by.",
    operand_default: 0,
    apply: multiply,
};

const DIVIDE: Operation = Operation {
    key: "divide_number",
    name: "Divide Number",
    description: "Divide a number.",
    operand: "divisor",
    operand_description: "The number that we divide our starting number by.",
    operand_default: 0,
    apply: divide,
};

const INCREMENT: Operation = Operation {
    key: "increment_by_one",
    name: "Increase by One",
    description: "Increase a number, by one unless told otherwise.",
    operand: "increment",
    operand_description: "The amount added to our starting number.",
    operand_default: 1,
    apply: add,
};

arithmetic_command!(
    /// Emits `start + addition`.
    AddCommand,
    ADD
);

arithmetic_command!(
    /// Emits `start - subtraction`.
    SubtractCommand,
    SUBTRACT
);

arithmetic_command!(
    /// Emits `start * multiplier`.
    MultiplyCommand,
    MULTIPLY
);

arithmetic_command!(
    /// Emits `start / divisor`. A zero divisor yields an infinity, or `NaN`
    /// when `start` is zero too.
    DivideCommand,
    DIVIDE
);

arithmetic_command!(
    /// Emits `start + increment`, where `increment` defaults to one.
    IncrementCommand,
    INCREMENT
);

#[cfg(test)]
mod tests;
