//! Built-in rule semantics.

use super::{CheckResult, Rule, RuleKind};
use crate::error::ValidatorError;

/// Evaluate a built-in rule kind against `value`.
pub(crate) async fn evaluate_builtin(rule: &Rule, value: &str) -> CheckResult {
    let failed = match rule.kind() {
        RuleKind::Required => value.is_empty(),
        RuleKind::Pattern(re) => !re.is_match(value),
        RuleKind::MinLength(min) => value.chars().count() < *min,
        RuleKind::MaxLength(max) => value.chars().count() > *max,
        RuleKind::Validate(validate) => return validate(value.to_string()).await,
        RuleKind::Custom => {
            return Err(ValidatorError::new(format!(
                "no validator registered for rule '{}'",
                rule.name()
            )));
        }
    };

    Ok(failed.then(|| rule.message()))
}
