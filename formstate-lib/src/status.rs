//! Per-field validation outcomes.

use serde::Serialize;

/// A failing rule and its message, as exposed in `FormState::errors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Name of the rule that failed.
    pub rule: String,
    /// Failure message. May be empty.
    pub message: String,
}

impl FieldError {
    pub fn new(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.rule, self.message)
    }
}

/// Outcome of the last pipeline run for a field.
///
/// Exactly one status is held per field; each run replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationStatus {
    /// The value this status was produced for. `None` for a fresh field.
    pub value: Option<String>,
    /// Rule that produced this status.
    pub rule: Option<String>,
    /// Failure message, when invalid.
    pub message: Option<String>,
    pub valid: bool,
    /// Stop evaluating further rules in the current run.
    pub terminate: bool,
}

impl Default for ValidationStatus {
    fn default() -> Self {
        Self {
            value: None,
            rule: None,
            message: None,
            valid: true,
            terminate: false,
        }
    }
}

impl ValidationStatus {
    /// Status produced by evaluating `rule` against `value`.
    ///
    /// `message == None` means the rule passed.
    pub fn evaluated(rule: &str, value: &str, message: Option<String>) -> Self {
        let valid = message.is_none();
        Self {
            value: Some(value.to_string()),
            rule: Some(rule.to_string()),
            message,
            valid,
            terminate: !valid,
        }
    }

    /// The same status with `terminate` cleared, used to seed a new run.
    pub fn restarted(&self) -> Self {
        Self {
            terminate: false,
            ..self.clone()
        }
    }

    /// Whether this status was produced for exactly `value`.
    pub fn is_for(&self, value: &str) -> bool {
        self.value.as_deref() == Some(value)
    }

    /// The error to expose, if this status is invalid.
    pub fn error(&self) -> Option<FieldError> {
        if self.valid {
            return None;
        }
        Some(FieldError::new(
            self.rule.clone().unwrap_or_default(),
            self.message.clone().unwrap_or_default(),
        ))
    }
}
