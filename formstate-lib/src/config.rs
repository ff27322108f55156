//! Form configuration

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::constraint::{ConstraintValidation, FormValidity};
use crate::rules::{RuleValidator, ValidatorRegistry};
use crate::sanitize::Sanitizers;

/// The event kinds on which validation may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Submit,
    Change,
    Blur,
}

impl Trigger {
    /// Lowercase name, as used in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Change => "change",
            Self::Blur => "blur",
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a [`FormEngine`](crate::FormEngine).
///
/// The data members can be deserialized; custom validators, sanitizers and
/// constraint hooks are installed through the builder methods.
///
/// # Example
///
/// ```
/// use formstate_lib::{FormConfig, Trigger};
///
/// let config = FormConfig::default()
///     .with_validate_on([Trigger::Change, Trigger::Submit])
///     .with_default_value("country", "NZ")
///     .with_cache_errors(false);
///
/// assert!(config.triggers_on(Trigger::Change));
/// assert!(!config.triggers_on(Trigger::Blur));
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Memoize failing outcomes per field and value.
    ///
    /// Default: `true`
    pub cache_errors: bool,

    /// Trigger set: the events on which validation is permitted to run.
    ///
    /// Default: `[submit]`
    pub validate_on: Vec<Trigger>,

    /// Initial field values.
    pub default_values: HashMap<String, String>,

    /// Custom rule validators, keyed by rule name. These take precedence
    /// over built-in rules of the same name.
    #[serde(skip)]
    pub validators: ValidatorRegistry,

    /// Named input sanitizers.
    #[serde(skip)]
    pub sanitizers: Sanitizers,

    /// Native constraint-validation hooks. Disabled when `None`.
    #[serde(skip)]
    pub constraint_validation: Option<ConstraintValidation>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            cache_errors: true,
            validate_on: vec![Trigger::Submit],
            default_values: HashMap::new(),
            validators: ValidatorRegistry::default(),
            sanitizers: Sanitizers::default(),
            constraint_validation: None,
        }
    }
}

impl FormConfig {
    /// Creates a new form config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if validation may run for `trigger`.
    pub fn triggers_on(&self, trigger: Trigger) -> bool {
        self.validate_on.contains(&trigger)
    }

    /// Enables or disables error caching.
    pub fn with_cache_errors(mut self, enabled: bool) -> Self {
        self.cache_errors = enabled;
        self
    }

    /// Replaces the trigger set.
    pub fn with_validate_on(mut self, triggers: impl IntoIterator<Item = Trigger>) -> Self {
        self.validate_on = triggers.into_iter().collect();
        self
    }

    /// Seeds a field value.
    pub fn with_default_value(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_values.insert(field.into(), value.into());
        self
    }

    /// Registers a custom validator under a rule name.
    pub fn with_validator(mut self, rule: impl Into<String>, validator: Arc<dyn RuleValidator>) -> Self {
        self.validators.insert(rule, validator);
        self
    }

    /// Registers a named sanitizer.
    pub fn with_sanitizer<F>(mut self, name: impl Into<String>, sanitizer: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.sanitizers.insert(name, sanitizer);
        self
    }

    /// Enables native constraint validation, reporting through `form`.
    pub fn with_constraint_validation(mut self, form: Arc<dyn FormValidity>) -> Self {
        self.constraint_validation = Some(ConstraintValidation::new(form));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FormConfig::default();
        assert!(config.cache_errors);
        assert_eq!(config.validate_on, vec![Trigger::Submit]);
        assert!(config.default_values.is_empty());
        assert!(config.constraint_validation.is_none());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: FormConfig = serde_json::from_str(
            r#"{ "validate_on": ["change", "blur"], "default_values": { "zip": "1010" } }"#,
        )
        .unwrap();
        assert!(config.cache_errors);
        assert!(config.triggers_on(Trigger::Change));
        assert!(config.triggers_on(Trigger::Blur));
        assert!(!config.triggers_on(Trigger::Submit));
        assert_eq!(config.default_values.get("zip").map(String::as_str), Some("1010"));
    }

    #[test]
    fn test_deserialize_rejects_unknown_trigger() {
        let result = serde_json::from_str::<FormConfig>(r#"{ "validate_on": ["hover"] }"#);
        assert!(result.is_err());
    }
}
