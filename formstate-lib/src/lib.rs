//! Form state and validation engine
//!
//! Tracks a set of named fields, their values and validation status, and
//! runs rule validation on change, blur and submit independently of any
//! rendering layer.

pub mod cache;
pub mod config;
pub mod constraint;
pub mod error;
pub mod event;
pub mod pipeline;
pub mod rules;
pub mod sanitize;
pub mod state;
pub mod status;

mod engine;
mod task;

pub use config::{FormConfig, Trigger};
pub use engine::{FieldBinding, FormEngine, SubmitResult, ValidationRequest};
pub use error::{FormError, ValidatorError};
pub use event::{EventTarget, FieldInput, SubmitEvent};
pub use state::{FieldSnapshot, FormState};
pub use status::{FieldError, ValidationStatus};
pub use task::extract_panic_message;

pub mod prelude {
    pub use crate::config::{FormConfig, Trigger};
    pub use crate::constraint::{FormValidity, InputValidity};
    pub use crate::engine::{FieldBinding, FormEngine, SubmitResult, ValidationRequest};
    pub use crate::error::{FormError, VALIDATOR_ERROR_MESSAGE, ValidatorError};
    pub use crate::event::{EventTarget, FieldInput, SubmitEvent};
    pub use crate::rules::{CheckResult, Rule, RuleValidator, Rules, validator_fn};
    pub use crate::state::{FieldSnapshot, FormState};
    pub use crate::status::{FieldError, ValidationStatus};
}
