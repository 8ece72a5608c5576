//! Sanitation and validation collaborators.
//!
//! An [`Input`](crate::Input) never hardcodes a rule set. It hands its
//! resolved value, type tag and options to a [`Sanitation`] or [`Validation`]
//! implementation and adopts whatever comes back. The registries in this
//! module look a handler up by type tag; types without a handler pass through
//! unchanged and produce no issues.

mod builtin;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::value::{Options, Value};

pub use self::builtin::{
    sanitize_boolean, sanitize_number, sanitize_string, validate_number, validate_string,
};

/// A value awaiting sanitation.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitationRequest<'a> {
    input_type: &'a str,
    value: Value,
    options: &'a Options,
}

impl<'a> SanitationRequest<'a> {
    /// Creates a request for the given type tag.
    #[must_use]
    pub const fn new(input_type: &'a str, value: Value, options: &'a Options) -> Self {
        Self {
            input_type,
            value,
            options,
        }
    }

    /// Returns the type tag used to pick a handler.
    #[must_use]
    pub const fn input_type(&self) -> &'a str {
        self.input_type
    }

    /// Returns the value to clean.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the handler options.
    #[must_use]
    pub const fn options(&self) -> &'a Options {
        self.options
    }

    /// Consumes the request, returning the untouched value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }
}

/// A value awaiting validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationRequest<'a> {
    input_type: &'a str,
    value: &'a Value,
    options: &'a Options,
}

impl<'a> ValidationRequest<'a> {
    /// Creates a request for the given type tag.
    #[must_use]
    pub const fn new(input_type: &'a str, value: &'a Value, options: &'a Options) -> Self {
        Self {
            input_type,
            value,
            options,
        }
    }

    /// Returns the type tag used to pick a handler.
    #[must_use]
    pub const fn input_type(&self) -> &'a str {
        self.input_type
    }

    /// Returns the value to check.
    #[must_use]
    pub const fn value(&self) -> &'a Value {
        self.value
    }

    /// Returns the handler options.
    #[must_use]
    pub const fn options(&self) -> &'a Options {
        self.options
    }
}

/// One finding reported by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    input_type: String,
    message: String,
}

impl ValidationIssue {
    /// Creates an issue for the given type tag.
    #[must_use]
    pub fn new(input_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            input_type: input_type.into(),
            message: message.into(),
        }
    }

    /// Returns the type tag that was checked.
    #[must_use]
    pub const fn input_type(&self) -> &str {
        self.input_type.as_str()
    }

    /// Returns the human-readable finding.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.input_type, self.message)
    }
}

/// Collaborator that cleans resolved input values.
pub trait Sanitation: Send + Sync {
    /// Returns the cleaned replacement for the request's value.
    fn sanitize(&self, request: SanitationRequest<'_>) -> Value;
}

/// Collaborator that checks resolved input values.
pub trait Validation: Send + Sync {
    /// Returns every issue found; an empty list means the value is valid.
    fn validate(&self, request: ValidationRequest<'_>) -> Vec<ValidationIssue>;
}

/// Handler signature for a single sanitized type.
pub type SanitizeHandler = dyn Fn(&Value, &Options) -> Value + Send + Sync;

/// Handler signature for a single validated type.
pub type ValidateHandler = dyn Fn(&Value, &Options) -> Vec<String> + Send + Sync;

/// Sanitizers keyed by type tag.
///
/// # Example
///
/// ```
/// use sluice_core::{Options, Sanitation, SanitationRequest, TypeSanitizers, Value};
///
/// let sanitizers = TypeSanitizers::with_builtins();
/// let options = Options::new();
/// let cleaned = sanitizers.sanitize(SanitationRequest::new("number", Value::from("12"), &options));
/// assert_eq!(cleaned, Value::Number(12.0));
///
/// let untouched = sanitizers.sanitize(SanitationRequest::new("phone", Value::from("12"), &options));
/// assert_eq!(untouched, Value::from("12"));
/// ```
#[derive(Clone, Default)]
pub struct TypeSanitizers {
    handlers: HashMap<String, Arc<SanitizeHandler>>,
}

impl TypeSanitizers {
    /// Creates a registry without handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the `number`, `string` and `boolean` handlers.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut sanitizers = Self::new();
        sanitizers
            .register("number", sanitize_number)
            .register("string", sanitize_string)
            .register("boolean", sanitize_boolean);
        sanitizers
    }

    /// Registers or replaces the handler for a type tag.
    pub fn register<F>(&mut self, input_type: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&Value, &Options) -> Value + Send + Sync + 'static,
    {
        self.handlers.insert(input_type.into(), Arc::new(handler));
        self
    }

    /// Returns `true` when a handler exists for the type tag.
    #[must_use]
    pub fn has(&self, input_type: &str) -> bool {
        self.handlers.contains_key(input_type)
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for TypeSanitizers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&String> = self.handlers.keys().collect();
        types.sort();
        f.debug_struct("TypeSanitizers")
            .field("types", &types)
            .finish()
    }
}

impl Sanitation for TypeSanitizers {
    fn sanitize(&self, request: SanitationRequest<'_>) -> Value {
        match self.handlers.get(request.input_type()) {
            Some(handler) => handler(request.value(), request.options()),
            None => request.into_value(),
        }
    }
}

/// Validators keyed by type tag.
#[derive(Clone, Default)]
pub struct TypeValidators {
    handlers: HashMap<String, Arc<ValidateHandler>>,
}

impl TypeValidators {
    /// Creates a registry without handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the `number` and `string` handlers.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut validators = Self::new();
        validators
            .register("number", validate_number)
            .register("string", validate_string);
        validators
    }

    /// Registers or replaces the handler for a type tag.
    ///
    /// Handlers return plain messages; the registry wraps them into
    /// [`ValidationIssue`]s tagged with the checked type.
    pub fn register<F>(&mut self, input_type: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&Value, &Options) -> Vec<String> + Send + Sync + 'static,
    {
        self.handlers.insert(input_type.into(), Arc::new(handler));
        self
    }

    /// Returns `true` when a handler exists for the type tag.
    #[must_use]
    pub fn has(&self, input_type: &str) -> bool {
        self.handlers.contains_key(input_type)
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for TypeValidators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&String> = self.handlers.keys().collect();
        types.sort();
        f.debug_struct("TypeValidators")
            .field("types", &types)
            .finish()
    }
}

impl Validation for TypeValidators {
    fn validate(&self, request: ValidationRequest<'_>) -> Vec<ValidationIssue> {
        let Some(handler) = self.handlers.get(request.input_type()) else {
            return Vec::new();
        };
        handler(request.value(), request.options())
            .into_iter()
            .map(|message| ValidationIssue::new(request.input_type(), message))
            .collect()
    }
}

#[cfg(test)]
mod tests;
