//! Engine configuration errors

/// Error returned when a form or one of its fields is misconfigured.
///
/// Validation failures are never reported through this type; they live in
/// [`FormState::errors`](crate::FormState).
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// A rule names neither a built-in kind nor a registered custom validator.
    #[error("Field '{field}' declares rule '{rule}' but no validator is registered for it")]
    UnknownRule { field: String, rule: String },

    /// A `pattern` rule was declared with an expression that does not compile.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl FormError {
    /// Creates a new unknown rule error.
    pub fn unknown_rule(field: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::UnknownRule {
            field: field.into(),
            rule: rule.into(),
        }
    }
}
