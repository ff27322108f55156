//! Sequential, short-circuiting rule evaluation.
//!
//! A pipeline is built from a field's rules in declaration order. Running it
//! folds a status through each rule-check: a check receives the status the
//! previous one produced and either passes it through (skipped, or an
//! earlier check already failed) or replaces it with its own verdict. The
//! first failure wins.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use log::{trace, warn};

use crate::config::Trigger;
use crate::error::VALIDATOR_ERROR_MESSAGE;
use crate::rules::{CheckResult, Rule, RuleKind, RuleValidator, Rules, ValidatorRegistry, evaluate_builtin};
use crate::status::ValidationStatus;
use crate::task::extract_panic_message;

enum Evaluator {
    Builtin,
    External(Arc<dyn RuleValidator>),
}

/// A single rule bound to the validator that evaluates it.
pub struct RuleCheck {
    rule: Rule,
    evaluator: Evaluator,
}

impl RuleCheck {
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    async fn evaluate(&self, value: &str) -> CheckResult {
        match &self.evaluator {
            Evaluator::Builtin => evaluate_builtin(&self.rule, value).await,
            Evaluator::External(validator) => validator.validate(value, &self.rule).await,
        }
    }

    /// Run this check against `value`, given the previous step's status.
    ///
    /// A validator that errors or panics yields an invalid status carrying
    /// [`VALIDATOR_ERROR_MESSAGE`].
    pub async fn run(&self, previous: ValidationStatus, value: &str, trigger: Trigger) -> ValidationStatus {
        if self.rule.should_skip(value, trigger) {
            trace!("[pipeline] rule '{}' skipped on {}", self.rule.name(), trigger);
            return previous;
        }

        let message = match AssertUnwindSafe(self.evaluate(value)).catch_unwind().await {
            Ok(Ok(message)) => message,
            Ok(Err(err)) => {
                warn!("[pipeline] rule '{}' validator failed: {}", self.rule.name(), err);
                Some(VALIDATOR_ERROR_MESSAGE.to_string())
            }
            Err(panic) => {
                warn!(
                    "[pipeline] rule '{}' validator panicked: {}",
                    self.rule.name(),
                    extract_panic_message(&*panic)
                );
                Some(VALIDATOR_ERROR_MESSAGE.to_string())
            }
        };

        ValidationStatus::evaluated(self.rule.name(), value, message)
    }
}

/// An ordered list of rule-checks.
pub struct Pipeline {
    checks: Vec<RuleCheck>,
}

impl Pipeline {
    /// Bind each rule to its validator. Registered validators override
    /// built-ins of the same name; a custom rule with no registered
    /// validator is left out.
    pub fn build(rules: &Rules, registry: &ValidatorRegistry) -> Self {
        let checks = rules
            .iter()
            .filter_map(|rule| {
                let evaluator = match registry.get(rule.name()) {
                    Some(validator) => Evaluator::External(validator),
                    None if matches!(rule.kind(), RuleKind::Custom) => {
                        warn!("[pipeline] no validator for rule '{}', omitted", rule.name());
                        return None;
                    }
                    None => Evaluator::Builtin,
                };
                Some(RuleCheck {
                    rule: rule.clone(),
                    evaluator,
                })
            })
            .collect();

        Self { checks }
    }

    pub fn checks(&self) -> &[RuleCheck] {
        &self.checks
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Fold `initial` through every check, stopping at the first failure.
    pub async fn run(&self, initial: ValidationStatus, value: &str, trigger: Trigger) -> ValidationStatus {
        let mut status = initial;
        for check in &self.checks {
            if status.terminate {
                break;
            }
            status = check.run(status, value, trigger).await;
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::ValidatorError;
    use crate::rules::validator_fn;

    fn counting(counter: &Arc<AtomicUsize>, message: Option<&'static str>) -> Rule {
        let counter = Arc::clone(counter);
        Rule::validate_sync(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            message.map(str::to_string)
        })
    }

    #[tokio::test]
    async fn test_first_failure_wins() {
        let calls = Arc::new(AtomicUsize::new(0));
        let rules = Rules::new()
            .required("Required")
            .min_length(3, "Too short")
            .with(counting(&calls, Some("never")));
        let pipeline = Pipeline::build(&rules, &ValidatorRegistry::default());

        let status = pipeline.run(ValidationStatus::default(), "ab", Trigger::Submit).await;
        assert!(!status.valid);
        assert_eq!(status.rule.as_deref(), Some("minLength"));
        assert_eq!(status.message.as_deref(), Some("Too short"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_pass() {
        let rules = Rules::new().required("Required").max_length(5, "Too long");
        let pipeline = Pipeline::build(&rules, &ValidatorRegistry::default());

        let status = pipeline.run(ValidationStatus::default(), "abc", Trigger::Change).await;
        assert!(status.valid);
        assert!(!status.terminate);
        assert_eq!(status.rule.as_deref(), Some("maxLength"));
        assert_eq!(status.value.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_skipped_rule_passes_previous_through() {
        let rules = Rules::new().with(Rule::required("Required").with_skip(|_, t| t == Trigger::Change));
        let pipeline = Pipeline::build(&rules, &ValidatorRegistry::default());

        let previous = ValidationStatus::evaluated("pattern", "old", Some("bad".into())).restarted();
        let status = pipeline.run(previous.clone(), "", Trigger::Change).await;
        assert_eq!(status, previous);

        let status = pipeline.run(previous, "", Trigger::Submit).await;
        assert_eq!(status.rule.as_deref(), Some("required"));
    }

    #[tokio::test]
    async fn test_terminated_initial_status_skips_everything() {
        let calls = Arc::new(AtomicUsize::new(0));
        let rules = Rules::new().with(counting(&calls, None));
        let pipeline = Pipeline::build(&rules, &ValidatorRegistry::default());

        let initial = ValidationStatus::evaluated("required", "", Some("r".into()));
        let status = pipeline.run(initial.clone(), "x", Trigger::Submit).await;
        assert_eq!(status, initial);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_registry_overrides_builtin() {
        let mut registry = ValidatorRegistry::default();
        registry.insert(
            "required",
            validator_fn(|value, rule| async move {
                Ok(value.trim().is_empty().then(|| format!("{}!", rule.message())))
            }),
        );
        let rules = Rules::new().required("Required");
        let pipeline = Pipeline::build(&rules, &registry);

        let status = pipeline.run(ValidationStatus::default(), "   ", Trigger::Submit).await;
        assert_eq!(status.message.as_deref(), Some("Required!"));
    }

    #[tokio::test]
    async fn test_unknown_custom_rule_is_omitted() {
        let rules = Rules::new().with(Rule::custom("email")).required("Required");
        let pipeline = Pipeline::build(&rules, &ValidatorRegistry::default());
        assert_eq!(pipeline.len(), 1);
        assert_eq!(pipeline.checks()[0].rule().name(), "required");
    }

    #[tokio::test]
    async fn test_validator_error_becomes_invalid() {
        let rules = Rules::new()
            .with(Rule::try_validate(|_| async { Err(ValidatorError::new("backend down")) }));
        let pipeline = Pipeline::build(&rules, &ValidatorRegistry::default());

        let status = pipeline.run(ValidationStatus::default(), "x", Trigger::Submit).await;
        assert!(!status.valid);
        assert_eq!(status.rule.as_deref(), Some("validate"));
        assert_eq!(status.message.as_deref(), Some(VALIDATOR_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_validator_panic_becomes_invalid() {
        let rules = Rules::new().with(Rule::validate_sync(|v| {
            if v == "boom" {
                panic!("validator exploded");
            }
            None
        }));
        let pipeline = Pipeline::build(&rules, &ValidatorRegistry::default());

        let status = pipeline.run(ValidationStatus::default(), "boom", Trigger::Submit).await;
        assert!(!status.valid);
        assert_eq!(status.message.as_deref(), Some(VALIDATOR_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_empty_pipeline_returns_initial() {
        let pipeline = Pipeline::build(&Rules::new(), &ValidatorRegistry::default());
        assert!(pipeline.is_empty());
        let status = pipeline.run(ValidationStatus::default(), "x", Trigger::Submit).await;
        assert_eq!(status, ValidationStatus::default());
    }
}
