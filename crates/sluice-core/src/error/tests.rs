//! Unit tests for error types.

use std::error::Error as _;

use rstest::rstest;

use super::*;

#[test]
fn dependency_error_names_command_and_lookup() {
    let error = DependencyError {
        command: "Number".into(),
        lookup: "value".into(),
        input: "start".into(),
    };
    let message = error.to_string();
    assert!(message.contains("'Number'"), "expected command: {message}");
    assert!(message.contains("'value'"), "expected lookup: {message}");
    assert!(message.contains("'start'"), "expected input: {message}");
}

#[rstest]
#[case::missing(ConfigurationError::missing_option("lookup", "string"), "lookup")]
#[case::invalid(
    ConfigurationError::invalid_option("stateful", "boolean", "number"),
    "stateful"
)]
#[case::unknown_command(ConfigurationError::UnknownCommand { index: 7 }, "#7")]
#[case::duplicate_node(ConfigurationError::DuplicateNode { id: "sum".into() }, "sum")]
fn configuration_error_mentions_subject(
    #[case] error: ConfigurationError,
    #[case] expected: &str,
) {
    let message = error.to_string();
    assert!(
        message.contains(expected),
        "expected {expected} in message: {message}"
    );
}

#[test]
fn mismatched_pairs_reports_counts() {
    let error = CommandError::MismatchedPairs { keys: 2, values: 3 };
    assert_eq!(
        error.to_string(),
        "cannot create an object from 2 keys and 3 values"
    );
}

#[test]
fn process_error_is_transparent_for_dependencies() {
    let dependency = DependencyError {
        command: "Number".into(),
        lookup: "value".into(),
        input: "start".into(),
    };
    let error = ProcessError::from(dependency.clone());
    assert_eq!(error.to_string(), dependency.to_string());
}

#[test]
fn execute_error_keeps_command_error_as_source() {
    let error = ProcessError::Execute {
        command: "Object".into(),
        source: CommandError::failed("boom"),
    };
    assert!(error.to_string().contains("'Object' failed: boom"));
    let source = error.source().expect("source is kept");
    assert_eq!(source.to_string(), "boom");
}

#[test]
fn errors_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ProcessError>();
}
