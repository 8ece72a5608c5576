//! Unit tests for the arithmetic commands.

use rstest::rstest;
use sluice_core::{Command, CommandError, Map, Options, Value};

use super::*;
use crate::tests::execute;

async fn value_of(command: &dyn Command, inputs: &Map, options: Options) -> f64 {
    let outputs = execute(command, inputs, options)
        .await
        .expect("command executes");
    outputs
        .get("value")
        .and_then(Value::as_f64)
        .expect("numeric value output")
}

#[rstest]
#[case::add(&AddCommand as &dyn Command, "addition", 15.0)]
#[case::subtract(&SubtractCommand as &dyn Command, "subtraction", -5.0)]
#[case::multiply(&MultiplyCommand as &dyn Command, "multiplier", 50.0)]
#[case::divide(&DivideCommand as &dyn Command, "divisor", 0.5)]
#[case::increment(&IncrementCommand as &dyn Command, "increment", 15.0)]
#[tokio::test]
async fn operations_combine_options(
    #[case] command: &dyn Command,
    #[case] operand: &str,
    #[case] expected: f64,
) {
    let options = Options::new().with("start", 5).with(operand, 10);
    let value = value_of(command, &Map::new(), options).await;
    assert_eq!(Value::Number(value), Value::Number(expected));
}

#[tokio::test]
async fn inputs_override_options() {
    let mut inputs = Map::new();
    inputs.insert("start".into(), Value::Number(5.0));
    inputs.insert("addition".into(), Value::Number(10.0));
    let options = Options::new().with("start", 100).with("addition", 100);
    let value = value_of(&AddCommand, &inputs, options).await;
    assert_eq!(Value::Number(value), Value::Number(15.0));
}

#[tokio::test]
async fn zero_inputs_are_not_replaced_by_options() {
    let mut inputs = Map::new();
    inputs.insert("start".into(), Value::Number(0.0));
    let options = Options::new().with("start", 8).with("addition", 2);
    let value = value_of(&AddCommand, &inputs, options).await;
    assert_eq!(Value::Number(value), Value::Number(2.0));
}

#[tokio::test]
async fn division_by_zero_is_infinite() {
    let options = Options::new().with("start", 10).with("divisor", 0);
    let value = value_of(&DivideCommand, &Map::new(), options).await;
    assert!(value.is_infinite() && value.is_sign_positive());
}

#[tokio::test]
async fn zero_over_zero_is_nan() {
    let value = value_of(&DivideCommand, &Map::new(), Options::new()).await;
    assert!(value.is_nan());
}

#[tokio::test]
async fn increment_defaults_to_one() {
    let options = Options::new().with("start", 41);
    let value = value_of(&IncrementCommand, &Map::new(), options).await;
    assert_eq!(Value::Number(value), Value::Number(42.0));
}

#[tokio::test]
async fn numeric_text_is_accepted() {
    let options = Options::new().with("start", "1.5").with("multiplier", "4");
    let value = value_of(&MultiplyCommand, &Map::new(), options).await;
    assert_eq!(Value::Number(value), Value::Number(6.0));
}

#[tokio::test]
async fn non_numeric_operand_fails() {
    let options = Options::new().with("subtraction", Value::List(Vec::new()));
    let err = execute(&SubtractCommand, &Map::new(), options)
        .await
        .expect_err("lists are not numbers");
    assert_eq!(
        err,
        CommandError::NonNumeric {
            name: String::from("subtraction"),
            found: String::from("[]"),
        }
    );
}

#[rstest]
#[case::add(AddCommand.describe(), "add_number", "addition")]
#[case::subtract(SubtractCommand.describe(), "subtract_number", "subtraction")]
#[case::multiply(MultiplyCommand.describe(), "multiply_number", "multiplier")]
#[case::divide(DivideCommand.describe(), "divide_number", "divisor")]
#[case::increment(IncrementCommand.describe(), "increment_by_one", "increment")]
fn descriptions_name_their_operands(
    #[case] description: sluice_core::CommandDescription,
    #[case] key: &str,
    #[case] operand: &str,
) {
    assert_eq!(description.key(), Some(key));
    let inputs: Vec<&str> = description.inputs().iter().map(PortDescription::name).collect();
    assert_eq!(inputs, ["start", operand]);
    assert_eq!(description.outputs().len(), 1);
}

#[rstest]
#[case::add(AddCommand.defaults(), "addition", 0.0)]
#[case::increment(IncrementCommand.defaults(), "increment", 1.0)]
fn defaults_seed_operands(#[case] defaults: Options, #[case] operand: &str, #[case] expected: f64) {
    assert_eq!(defaults.get("start"), Some(&Value::Number(0.0)));
    assert_eq!(defaults.get(operand), Some(&Value::Number(expected)));
}
