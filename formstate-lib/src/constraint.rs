//! Native constraint-validation hooks.
//!
//! A host that renders real inputs can surface validation failures through
//! its own validity UI. Inputs expose [`InputValidity`] on the events they
//! send, and the form exposes [`FormValidity`] through
//! [`FormConfig::with_constraint_validation`](crate::FormConfig::with_constraint_validation).

use std::sync::Arc;

/// Per-input custom validity message sink.
pub trait InputValidity: Send + Sync {
    /// Set the input's custom validity message. An empty message clears it.
    fn set_custom_validity(&self, message: &str);
}

/// Form-level validity reporter.
pub trait FormValidity: Send + Sync {
    /// Ask the host to display the current validity state.
    fn report_validity(&self);
}

/// Enabled constraint-validation settings.
#[derive(Clone)]
pub struct ConstraintValidation {
    form: Arc<dyn FormValidity>,
}

impl ConstraintValidation {
    pub fn new(form: Arc<dyn FormValidity>) -> Self {
        Self { form }
    }

    /// Clear any custom message on the input.
    pub(crate) fn clear(&self, input: Option<&Arc<dyn InputValidity>>) {
        if let Some(input) = input {
            input.set_custom_validity("");
        }
    }

    /// Set the failure message on the input and report form validity.
    pub(crate) fn report(&self, input: Option<&Arc<dyn InputValidity>>, message: &str) {
        if let Some(input) = input {
            input.set_custom_validity(message);
        }
        self.form.report_validity();
    }
}

impl std::fmt::Debug for ConstraintValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintValidation").finish_non_exhaustive()
    }
}
