//! Built-in handlers for the `number`, `string` and `boolean` type tags.

use crate::value::{Options, Value};

/// Coerces numeric strings and booleans into numbers.
///
/// Values that cannot be read as a number are returned unchanged so that a
/// validator can report them.
#[must_use]
pub fn sanitize_number(value: &Value, _options: &Options) -> Value {
    match value {
        Value::String(_) | Value::Bool(_) => value
            .as_f64()
            .map_or_else(|| value.clone(), Value::Number),
        _ => value.clone(),
    }
}

/// Renders scalars as text. Honours a boolean `trim` option.
#[must_use]
pub fn sanitize_string(value: &Value, options: &Options) -> Value {
    let text = match value {
        Value::String(text) => text.clone(),
        Value::Number(_) | Value::Bool(_) => value.to_string(),
        Value::Null | Value::List(_) | Value::Object(_) => return value.clone(),
    };
    let trim = options.get("trim").is_some_and(Value::is_truthy);
    if trim {
        Value::String(text.trim().to_owned())
    } else {
        Value::String(text)
    }
}

/// Reads `true`/`false`/`yes`/`no`/`1`/`0` text and numbers as booleans.
#[must_use]
pub fn sanitize_boolean(value: &Value, _options: &Options) -> Value {
    match value {
        Value::Number(number) => Value::Bool(*number != 0.0 && !number.is_nan()),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Value::Bool(true),
            "false" | "no" | "off" | "0" | "" => Value::Bool(false),
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

/// Requires a finite number within the optional `min`/`max` bounds.
#[must_use]
pub fn validate_number(value: &Value, options: &Options) -> Vec<String> {
    let Value::Number(number) = value else {
        return vec![format!("expected a number, got {}", value.kind())];
    };
    let mut messages = Vec::new();
    let allow_infinite = options.get("allow_infinite").is_some_and(Value::is_truthy);
    if !number.is_finite() && !allow_infinite {
        messages.push(format!("{number} is not a finite number"));
    }
    if let Some(min) = options.get("min").and_then(Value::as_f64) {
        if *number < min {
            messages.push(format!("{number} is below the minimum of {min}"));
        }
    }
    if let Some(max) = options.get("max").and_then(Value::as_f64) {
        if *number > max {
            messages.push(format!("{number} is above the maximum of {max}"));
        }
    }
    messages
}

/// Requires text whose length honours `min_length` and `max_length`.
///
/// A truthy `required_text` option also rejects blank text.
#[must_use]
pub fn validate_string(value: &Value, options: &Options) -> Vec<String> {
    let Value::String(text) = value else {
        return vec![format!("expected a string, got {}", value.kind())];
    };
    let length = text.chars().count();
    let mut messages = Vec::new();
    if options.get("required_text").is_some_and(Value::is_truthy) && text.trim().is_empty() {
        messages.push(String::from("text must not be blank"));
    }
    if let Some(min) = length_option(options, "min_length") {
        if length < min {
            messages.push(format!("text is shorter than {min} characters"));
        }
    }
    if let Some(max) = length_option(options, "max_length") {
        if length > max {
            messages.push(format!("text is longer than {max} characters"));
        }
    }
    messages
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "limits are filtered to finite, non-negative values before truncation"
)]
fn length_option(options: &Options, key: &str) -> Option<usize> {
    options
        .get(key)
        .and_then(Value::as_f64)
        .filter(|limit| limit.is_finite() && *limit >= 0.0)
        .map(|limit| limit.trunc() as usize)
}
