//! Rule declarations.
//!
//! A field's rules are an ordered list of named checks. Built-in kinds cover
//! the fixed primitives (`required`, `pattern`, `minLength`, `maxLength`,
//! `validate`); any other name refers to a custom validator registered on the
//! form through [`FormConfig::with_validator`](crate::FormConfig::with_validator).
//!
//! # Example
//!
//! ```
//! use formstate_lib::rules::{Rule, Rules};
//! use formstate_lib::Trigger;
//!
//! let rules = Rules::new()
//!     .required("Username is required")
//!     .min_length(3, "Username must be at least 3 characters")
//!     .with(Rule::validate_sync(|v| (v == "admin").then(|| "Reserved".to_string()))
//!         .prevent_validation_on(Trigger::Change));
//!
//! assert_eq!(rules.len(), 3);
//! ```

mod builtin;
mod registry;

pub use registry::*;

pub(crate) use builtin::evaluate_builtin;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use regex::Regex;

use crate::config::Trigger;
use crate::error::{FormError, ValidatorError};

/// Type alias for boxed futures used in async validation.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of a single check: `Ok(None)` passes, `Ok(Some(message))` fails.
pub type CheckResult = Result<Option<String>, ValidatorError>;

/// User validation function carried by the `validate` rule.
pub type ValidateFn = Arc<dyn Fn(String) -> BoxFuture<'static, CheckResult> + Send + Sync>;

/// Predicate deciding whether a rule sits out the current run.
pub type SkipFn = Arc<dyn Fn(&str, Trigger) -> bool + Send + Sync>;

pub const REQUIRED: &str = "required";
pub const PATTERN: &str = "pattern";
pub const MIN_LENGTH: &str = "minLength";
pub const MAX_LENGTH: &str = "maxLength";
pub const VALIDATE: &str = "validate";

/// What a rule checks.
#[derive(Clone)]
pub enum RuleKind {
    /// Value must not be empty.
    Required,
    /// Value must contain a match of the expression.
    Pattern(Regex),
    /// Value must have at least this many characters.
    MinLength(usize),
    /// Value must have at most this many characters.
    MaxLength(usize),
    /// User function; its returned message is the failure.
    Validate(ValidateFn),
    /// Resolved by name against the form's validator registry.
    Custom,
}

impl std::fmt::Debug for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => write!(f, "Required"),
            Self::Pattern(re) => write!(f, "Pattern({})", re.as_str()),
            Self::MinLength(n) => write!(f, "MinLength({})", n),
            Self::MaxLength(n) => write!(f, "MaxLength({})", n),
            Self::Validate(_) => write!(f, "Validate(<fn>)"),
            Self::Custom => write!(f, "Custom"),
        }
    }
}

/// Settings shared by every rule kind.
#[derive(Clone, Default)]
pub struct RuleConfig {
    /// Failure message for built-in kinds. `None` fails with an empty message.
    pub message: Option<String>,
    /// Event type on which this rule sits out.
    pub prevent_validation_on: Option<Trigger>,
    pub skip: Option<SkipFn>,
}

impl std::fmt::Debug for RuleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleConfig")
            .field("message", &self.message)
            .field("prevent_validation_on", &self.prevent_validation_on)
            .field("skip", &self.skip.is_some())
            .finish()
    }
}

/// A named validity check.
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    kind: RuleKind,
    config: RuleConfig,
}

impl Rule {
    fn builtin(name: &str, kind: RuleKind, message: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            config: RuleConfig {
                message,
                ..Default::default()
            },
        }
    }

    /// Require a non-empty value.
    pub fn required(message: impl Into<String>) -> Self {
        Self::builtin(REQUIRED, RuleKind::Required, Some(message.into()))
    }

    /// Require the value to match `regex`.
    pub fn pattern(regex: Regex, message: impl Into<String>) -> Self {
        Self::builtin(PATTERN, RuleKind::Pattern(regex), Some(message.into()))
    }

    /// Like [`Rule::pattern`], compiling the expression first.
    pub fn try_pattern(expr: &str, message: impl Into<String>) -> Result<Self, FormError> {
        Ok(Self::pattern(Regex::new(expr)?, message))
    }

    /// Require at least `min` characters.
    pub fn min_length(min: usize, message: impl Into<String>) -> Self {
        Self::builtin(MIN_LENGTH, RuleKind::MinLength(min), Some(message.into()))
    }

    /// Require at most `max` characters.
    pub fn max_length(max: usize, message: impl Into<String>) -> Self {
        Self::builtin(MAX_LENGTH, RuleKind::MaxLength(max), Some(message.into()))
    }

    /// Async user validation. The future resolves to the failure message,
    /// or `None` when the value is valid.
    pub fn validate<F, Fut>(f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<String>> + Send + 'static,
    {
        Self::try_validate(move |value| {
            let fut = f(value);
            async move { Ok(fut.await) }
        })
    }

    /// Async user validation that may fail to run.
    pub fn try_validate<F, Fut>(f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CheckResult> + Send + 'static,
    {
        let validate: ValidateFn =
            Arc::new(move |value: String| -> BoxFuture<'static, CheckResult> { Box::pin(f(value)) });
        Self::builtin(VALIDATE, RuleKind::Validate(validate), None)
    }

    /// Synchronous user validation.
    pub fn validate_sync<F>(f: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self::try_validate(move |value| {
            let f = Arc::clone(&f);
            async move { Ok(f(&value)) }
        })
    }

    /// A rule evaluated by the custom validator registered under `name`.
    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RuleKind::Custom,
            config: RuleConfig::default(),
        }
    }

    /// Set the failure message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.config.message = Some(message.into());
        self
    }

    /// Fail without a message.
    pub fn without_message(mut self) -> Self {
        self.config.message = None;
        self
    }

    /// Skip this rule when `skip(value, trigger)` returns true.
    pub fn with_skip<F>(mut self, skip: F) -> Self
    where
        F: Fn(&str, Trigger) -> bool + Send + Sync + 'static,
    {
        self.config.skip = Some(Arc::new(skip));
        self
    }

    /// Skip this rule for runs triggered by `trigger`.
    pub fn prevent_validation_on(mut self, trigger: Trigger) -> Self {
        self.config.prevent_validation_on = Some(trigger);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Configured message, or empty.
    pub fn message(&self) -> String {
        self.config.message.clone().unwrap_or_default()
    }

    pub(crate) fn should_skip(&self, value: &str, trigger: Trigger) -> bool {
        if self.config.prevent_validation_on == Some(trigger) {
            return true;
        }
        self.config.skip.as_ref().is_some_and(|skip| skip(value, trigger))
    }
}

/// A field's rules in declaration order, unique by name.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    rules: Vec<Rule>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule. A rule with the same name is replaced in place, keeping
    /// its original position.
    pub fn insert(&mut self, rule: Rule) {
        match self.rules.iter_mut().find(|r| r.name == rule.name) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }

    pub fn with(mut self, rule: Rule) -> Self {
        self.insert(rule);
        self
    }

    pub fn required(self, message: impl Into<String>) -> Self {
        self.with(Rule::required(message))
    }

    pub fn pattern(self, regex: Regex, message: impl Into<String>) -> Self {
        self.with(Rule::pattern(regex, message))
    }

    pub fn try_pattern(self, expr: &str, message: impl Into<String>) -> Result<Self, FormError> {
        Ok(self.with(Rule::try_pattern(expr, message)?))
    }

    pub fn min_length(self, min: usize, message: impl Into<String>) -> Self {
        self.with(Rule::min_length(min, message))
    }

    pub fn max_length(self, max: usize, message: impl Into<String>) -> Self {
        self.with(Rule::max_length(max, message))
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First custom rule with no validator in `registry`.
    pub(crate) fn unresolved(&self, registry: &ValidatorRegistry) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|r| matches!(r.kind, RuleKind::Custom) && !registry.contains(&r.name))
    }
}

impl FromIterator<Rule> for Rules {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        let mut rules = Rules::new();
        for rule in iter {
            rules.insert(rule);
        }
        rules
    }
}

impl<'a> IntoIterator for &'a Rules {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
