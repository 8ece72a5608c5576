//! Unit tests for the sanitation and validation registries.

use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn empty() -> Options {
    Options::new()
}

#[rstest]
#[case::numeric_text(Value::from("4.5"), Value::Number(4.5))]
#[case::flag(Value::Bool(true), Value::Number(1.0))]
#[case::word(Value::from("four"), Value::from("four"))]
#[case::infinite_text(Value::from("inf"), Value::from("inf"))]
#[case::number(Value::Number(3.0), Value::Number(3.0))]
fn number_sanitizer_coerces(empty: Options, #[case] input: Value, #[case] expected: Value) {
    assert_eq!(sanitize_number(&input, &empty), expected);
}

#[rstest]
fn string_sanitizer_stringifies_and_trims(empty: Options) {
    assert_eq!(sanitize_string(&Value::Number(5.0), &empty), Value::from("5"));
    let trim = Options::new().with("trim", true);
    assert_eq!(sanitize_string(&Value::from("  hi "), &trim), Value::from("hi"));
    assert_eq!(
        sanitize_string(&Value::from("  hi "), &empty),
        Value::from("  hi ")
    );
}

#[rstest]
#[case::yes(Value::from("Yes"), Value::Bool(true))]
#[case::zero(Value::from("0"), Value::Bool(false))]
#[case::number(Value::Number(2.0), Value::Bool(true))]
#[case::other(Value::from("maybe"), Value::from("maybe"))]
fn boolean_sanitizer_reads_words(empty: Options, #[case] input: Value, #[case] expected: Value) {
    assert_eq!(sanitize_boolean(&input, &empty), expected);
}

#[rstest]
fn number_validator_checks_bounds() {
    let bounds = Options::new().with("min", 0).with("max", 10);
    assert!(validate_number(&Value::Number(5.0), &bounds).is_empty());
    assert_eq!(validate_number(&Value::Number(-1.0), &bounds).len(), 1);
    assert_eq!(validate_number(&Value::Number(11.0), &bounds).len(), 1);
}

#[rstest]
fn number_validator_rejects_infinity_unless_allowed(empty: Options) {
    assert_eq!(validate_number(&Value::Number(f64::INFINITY), &empty).len(), 1);
    let allow = Options::new().with("allow_infinite", true);
    assert!(validate_number(&Value::Number(f64::INFINITY), &allow).is_empty());
}

#[rstest]
fn number_validator_rejects_text(empty: Options) {
    let messages = validate_number(&Value::from("3"), &empty);
    assert_eq!(messages, vec![String::from("expected a number, got string")]);
}

#[rstest]
fn string_validator_checks_length() {
    let limits = Options::new().with("min_length", 2).with("max_length", 4);
    assert!(validate_string(&Value::from("abc"), &limits).is_empty());
    assert_eq!(validate_string(&Value::from("a"), &limits).len(), 1);
    assert_eq!(validate_string(&Value::from("abcde"), &limits).len(), 1);
}

#[rstest]
fn string_validator_rejects_blank_required_text(empty: Options) {
    let required = Options::new().with("required_text", true);
    assert_eq!(
        validate_string(&Value::from("   "), &required),
        vec![String::from("text must not be blank")]
    );
    assert!(validate_string(&Value::from("   "), &empty).is_empty());
}

#[rstest]
fn sanitizers_pass_unknown_types_through(empty: Options) {
    let sanitizers = TypeSanitizers::with_builtins();
    assert!(sanitizers.has("number"));
    assert!(!sanitizers.has("phone"));
    let value = sanitizers.sanitize(SanitationRequest::new("phone", Value::from(" 1 "), &empty));
    assert_eq!(value, Value::from(" 1 "));
}

#[rstest]
fn sanitizers_use_registered_handler(empty: Options) {
    let mut sanitizers = TypeSanitizers::new();
    sanitizers.register("shout", |value: &Value, _: &Options| {
        Value::String(value.to_string().to_uppercase())
    });
    let value = sanitizers.sanitize(SanitationRequest::new("shout", Value::from("hey"), &empty));
    assert_eq!(value, Value::from("HEY"));
    assert_eq!(sanitizers.len(), 1);
}

#[rstest]
fn validators_tag_issues_with_type(empty: Options) {
    let validators = TypeValidators::with_builtins();
    let value = Value::from("seven");
    let issues = validators.validate(ValidationRequest::new("number", &value, &empty));
    assert_eq!(issues.len(), 1);
    let issue = issues.first().expect("one issue");
    assert_eq!(issue.input_type(), "number");
    assert!(issue.to_string().starts_with("number: "));
}

#[rstest]
fn validators_ignore_unknown_types(empty: Options) {
    let validators = TypeValidators::with_builtins();
    let value = Value::Null;
    assert!(
        validators
            .validate(ValidationRequest::new("uuid", &value, &empty))
            .is_empty()
    );
}

#[test]
fn debug_lists_registered_types() {
    let rendered = format!("{:?}", TypeValidators::with_builtins());
    assert_eq!(rendered, r#"TypeValidators { types: ["number", "string"] }"#);
}
