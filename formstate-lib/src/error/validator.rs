//! Custom validator failures

/// Error a custom validator returns when it could not run to completion.
///
/// This is distinct from a validation failure: a validator that rejects a
/// value returns `Ok(Some(message))`. A `ValidatorError` is turned into an
/// invalid status carrying [`VALIDATOR_ERROR_MESSAGE`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ValidatorError {
    /// Error message
    pub message: String,
}

/// Message shown for a field whose validator errored or panicked.
pub const VALIDATOR_ERROR_MESSAGE: &str = "validator error";

impl ValidatorError {
    /// Create a new validator error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for ValidatorError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ValidatorError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
