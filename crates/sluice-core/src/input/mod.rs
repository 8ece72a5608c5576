//! Declared dependencies between commands.
//!
//! An [`Input`] binds one output of an upstream command to a named slot on the
//! command that owns it. Besides the wiring it records whether the dependency
//! is required and how the pulled value is cleaned and checked before the
//! owning command sees it.

use std::fmt;
use std::sync::Arc;

use crate::checks::{Sanitation, SanitationRequest, Validation, ValidationIssue, ValidationRequest};
use crate::error::ConfigurationError;
use crate::graph::CommandId;
use crate::value::{Options, Value};

/// Type tag applied when none is given through the builder.
pub const DEFAULT_INPUT_TYPE: &str = "string";

/// Custom sanitizer closure.
pub type SanitizeFn = dyn Fn(Value) -> Value + Send + Sync;

/// Custom validator closure.
pub type ValidateFn = dyn Fn(&Value) -> Vec<ValidationIssue> + Send + Sync;

/// How an input's value is cleaned after it is resolved.
#[derive(Clone)]
pub enum SanitizeSpec {
    /// Skip sanitation.
    Disabled,
    /// Ask the sanitation collaborator, passing these options.
    Rule(Options),
    /// Replace the value with the closure's result.
    Custom(Arc<SanitizeFn>),
}

impl SanitizeSpec {
    /// Wraps a closure as a custom sanitizer.
    #[must_use]
    pub fn custom<F>(sanitizer: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(sanitizer))
    }

    /// Returns `true` unless sanitation is disabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

impl Default for SanitizeSpec {
    fn default() -> Self {
        Self::Rule(Options::new())
    }
}

impl From<bool> for SanitizeSpec {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::default()
        } else {
            Self::Disabled
        }
    }
}

impl From<Options> for SanitizeSpec {
    fn from(options: Options) -> Self {
        Self::Rule(options)
    }
}

impl TryFrom<&Value> for SanitizeSpec {
    type Error = ConfigurationError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Bool(enabled) => Ok(Self::from(*enabled)),
            Value::Object(map) => Ok(Self::Rule(Options::from(map.clone()))),
            other => Err(ConfigurationError::invalid_option(
                "sanitize",
                "boolean or object",
                other.kind(),
            )),
        }
    }
}

impl fmt::Debug for SanitizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::Rule(options) => f.debug_tuple("Rule").field(options).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// How an input's value is checked after sanitation.
#[derive(Clone, Default)]
pub enum ValidateSpec {
    /// Skip validation.
    #[default]
    Disabled,
    /// Ask the validation collaborator, passing these options.
    Rule(Options),
    /// Collect issues from the closure.
    Custom(Arc<ValidateFn>),
}

impl ValidateSpec {
    /// Wraps a closure as a custom validator.
    #[must_use]
    pub fn custom<F>(validator: F) -> Self
    where
        F: Fn(&Value) -> Vec<ValidationIssue> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(validator))
    }

    /// Returns `true` unless validation is disabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

impl From<bool> for ValidateSpec {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Rule(Options::new())
        } else {
            Self::Disabled
        }
    }
}

impl From<Options> for ValidateSpec {
    fn from(options: Options) -> Self {
        Self::Rule(options)
    }
}

impl TryFrom<&Value> for ValidateSpec {
    type Error = ConfigurationError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Bool(enabled) => Ok(Self::from(*enabled)),
            Value::Object(map) => Ok(Self::Rule(Options::from(map.clone()))),
            other => Err(ConfigurationError::invalid_option(
                "validate",
                "boolean or object",
                other.kind(),
            )),
        }
    }
}

impl fmt::Debug for ValidateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::Rule(options) => f.debug_tuple("Rule").field(options).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Construction options for an [`Input`].
///
/// `lookup` and the type tag are mandatory; everything else has a default:
/// unnamed inputs bind under their lookup key, inputs are optional,
/// sanitation asks the collaborator and validation is off.
///
/// # Example
///
/// ```
/// use sluice_core::{InputOptions, Options};
///
/// let options = InputOptions::new("value", "number")
///     .named("start")
///     .required(true)
///     .validate(Options::new().with("min", 0));
/// assert_eq!(options.lookup(), "value");
/// assert!(options.is_required());
/// ```
#[derive(Debug, Clone)]
pub struct InputOptions {
    name: Option<String>,
    description: Option<String>,
    input_type: String,
    lookup: String,
    required: bool,
    sanitize: SanitizeSpec,
    validate: ValidateSpec,
}

impl InputOptions {
    /// Creates options reading `lookup` from the upstream results.
    #[must_use]
    pub fn new(lookup: impl Into<String>, input_type: impl Into<String>) -> Self {
        Self {
            name: None,
            description: None,
            input_type: input_type.into(),
            lookup: lookup.into(),
            required: false,
            sanitize: SanitizeSpec::default(),
            validate: ValidateSpec::default(),
        }
    }

    /// Sets the binding name inside the owning command.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets a human-readable description.
    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the dependency as required.
    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the sanitation behaviour.
    #[must_use]
    pub fn sanitize(mut self, sanitize: impl Into<SanitizeSpec>) -> Self {
        self.sanitize = sanitize.into();
        self
    }

    /// Sets the validation behaviour.
    #[must_use]
    pub fn validate(mut self, validate: impl Into<ValidateSpec>) -> Self {
        self.validate = validate.into();
        self
    }

    /// Returns the upstream output key.
    #[must_use]
    pub const fn lookup(&self) -> &str {
        self.lookup.as_str()
    }

    /// Returns the type tag.
    #[must_use]
    pub const fn input_type(&self) -> &str {
        self.input_type.as_str()
    }

    /// Returns whether the dependency is required.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Reads input options from a configuration map.
    ///
    /// Recognised keys are `lookup`, `type`, `name`, `description`,
    /// `required`, `sanitize` and `validate`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingOption`] when `lookup` or `type`
    /// is absent or not a string, and [`ConfigurationError::InvalidOption`]
    /// when another recognised key has the wrong kind of value.
    pub fn from_options(options: &Options) -> Result<Self, ConfigurationError> {
        let lookup = required_text(options, "lookup")?;
        let input_type = required_text(options, "type")?;
        let mut parsed = Self::new(lookup, input_type);
        parsed.name = optional_text(options, "name")?;
        parsed.description = optional_text(options, "description")?;
        if let Some(value) = options.get("required") {
            parsed.required = value.as_bool().ok_or_else(|| {
                ConfigurationError::invalid_option("required", "boolean", value.kind())
            })?;
        }
        if let Some(value) = options.get("sanitize") {
            parsed.sanitize = SanitizeSpec::try_from(value)?;
        }
        if let Some(value) = options.get("validate") {
            parsed.validate = ValidateSpec::try_from(value)?;
        }
        Ok(parsed)
    }
}

fn required_text(options: &Options, key: &str) -> Result<String, ConfigurationError> {
    options
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| ConfigurationError::missing_option(key, "string"))
}

fn optional_text(options: &Options, key: &str) -> Result<Option<String>, ConfigurationError> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(ConfigurationError::invalid_option(
            key,
            "string",
            other.kind(),
        )),
    }
}

/// A named dependency on one output of an upstream command.
///
/// # Example
///
/// ```
/// use sluice_core::{CommandGraph, Input, InputOptions, Options, Value};
/// # use sluice_core::{Command, CommandError, ExecutionContext, Outputs};
/// # struct Constant;
/// # #[async_trait::async_trait]
/// # impl Command for Constant {
/// #     async fn execute(&self, _: ExecutionContext<'_>) -> Result<Outputs, CommandError> {
/// #         Ok(Outputs::new())
/// #     }
/// # }
///
/// let mut graph = CommandGraph::new();
/// let upstream = graph.add(Constant, vec![], Options::new()).expect("add upstream");
///
/// let mut input = Input::new(upstream, InputOptions::new("value", "number").named("start"));
/// assert_eq!(input.name(), "start");
/// assert!(input.value().is_none());
///
/// input.set_value(Value::from(3));
/// assert_eq!(input.value(), Some(&Value::Number(3.0)));
/// ```
#[derive(Debug, Clone)]
pub struct Input {
    name: String,
    description: Option<String>,
    input_type: String,
    lookup: String,
    required: bool,
    sanitize: SanitizeSpec,
    validate: ValidateSpec,
    command: CommandId,
    value: Option<Value>,
}

impl Input {
    /// Binds `command`'s output to a new input.
    #[must_use]
    pub fn new(command: CommandId, options: InputOptions) -> Self {
        let name = options.name.unwrap_or_else(|| options.lookup.clone());
        Self {
            name,
            description: options.description,
            input_type: options.input_type,
            lookup: options.lookup,
            required: options.required,
            sanitize: options.sanitize,
            validate: options.validate,
            command,
            value: None,
        }
    }

    /// Binds `command`'s output using options from a configuration map.
    ///
    /// # Errors
    ///
    /// Propagates the failures of [`InputOptions::from_options`].
    pub fn from_options(command: CommandId, options: &Options) -> Result<Self, ConfigurationError> {
        InputOptions::from_options(options).map(|parsed| Self::new(command, parsed))
    }

    /// Returns the binding name within the owning command.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the description, if one was given.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the type tag used to pick a sanitizer and validator.
    #[must_use]
    pub const fn input_type(&self) -> &str {
        self.input_type.as_str()
    }

    /// Returns the upstream output key.
    #[must_use]
    pub const fn lookup(&self) -> &str {
        self.lookup.as_str()
    }

    /// Returns the upstream command.
    #[must_use]
    pub const fn command(&self) -> CommandId {
        self.command
    }

    /// Returns whether a missing upstream output is fatal.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns whether the value is sanitized after resolution.
    #[must_use]
    pub const fn should_sanitize(&self) -> bool {
        self.sanitize.is_enabled()
    }

    /// Returns whether the value is validated after sanitation.
    #[must_use]
    pub const fn should_validate(&self) -> bool {
        self.validate.is_enabled()
    }

    /// Returns the resolved value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Stores a resolved value without checking it.
    pub fn set_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.value = Some(value.into());
        self
    }

    pub(crate) fn clear_value(&mut self) {
        self.value = None;
    }

    /// Replaces the value with its sanitized form.
    ///
    /// A custom closure is applied directly; otherwise the collaborator is
    /// asked with the rule options (or none when sanitation is disabled).
    /// Does nothing while the value is unset.
    pub fn sanitize(&mut self, sanitation: &dyn Sanitation) -> &mut Self {
        let Some(value) = self.value.take() else {
            return self;
        };
        let cleaned = match &self.sanitize {
            SanitizeSpec::Custom(sanitizer) => sanitizer(value),
            SanitizeSpec::Rule(options) => {
                sanitation.sanitize(SanitationRequest::new(&self.input_type, value, options))
            }
            SanitizeSpec::Disabled => {
                let options = Options::new();
                sanitation.sanitize(SanitationRequest::new(&self.input_type, value, &options))
            }
        };
        self.value = Some(cleaned);
        self
    }

    /// Checks the value and returns every issue found.
    ///
    /// Returns an empty list while the value is unset.
    #[must_use]
    pub fn validate(&self, validation: &dyn Validation) -> Vec<ValidationIssue> {
        let Some(value) = self.value.as_ref() else {
            return Vec::new();
        };
        match &self.validate {
            ValidateSpec::Custom(validator) => validator(value),
            ValidateSpec::Rule(options) => {
                validation.validate(ValidationRequest::new(&self.input_type, value, options))
            }
            ValidateSpec::Disabled => {
                let options = Options::new();
                validation.validate(ValidationRequest::new(&self.input_type, value, &options))
            }
        }
    }
}
